//! A single page: independent object collections plus an optional background.

use crate::objects::{
    Image, Object, ObjectId, ObjectKind, ObjectTrait, SerializableColor, Shape, StickyNote,
    Stroke, Table, Text,
};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// One color stop of a gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position along the gradient, 0.0..=1.0.
    pub offset: f64,
    pub color: SerializableColor,
}

/// Page background fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Background {
    Solid(SerializableColor),
    /// Angle in degrees, 0 = left to right.
    LinearGradient { angle: f64, stops: Vec<GradientStop> },
    RadialGradient { stops: Vec<GradientStop> },
}

/// Which side of a spread a page sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSide {
    /// Index 0, always shown alone.
    Cover,
    Left,
    Right,
}

impl PageSide {
    /// Odd pages sit on the right, even pages past the cover on the left.
    pub fn of(index: usize) -> Self {
        if index == 0 {
            PageSide::Cover
        } else if index % 2 == 1 {
            PageSide::Right
        } else {
            PageSide::Left
        }
    }
}

/// Z-order step direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZDirection {
    /// One step towards the front.
    Forward,
    /// One step towards the back.
    Backward,
}

/// A whole-field replacement for `Book::update_page_field`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PageField {
    Background(Option<Background>),
    Strokes(Vec<Stroke>),
    Texts(Vec<Text>),
    Shapes(Vec<Shape>),
    Images(Vec<Image>),
    Notes(Vec<StickyNote>),
    Tables(Vec<Table>),
}

/// A page of the book.
///
/// Each collection is kept in z-order (back to front). Across collections the
/// render order is strokes, shapes, images, texts, notes, tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Page {
    pub strokes: Vec<Stroke>,
    pub texts: Vec<Text>,
    pub shapes: Vec<Shape>,
    pub images: Vec<Image>,
    pub notes: Vec<StickyNote>,
    pub tables: Vec<Table>,
    pub background: Option<Background>,
}

fn position_of<T: ObjectTrait>(items: &[T], id: ObjectId) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}

fn swap_neighbour<T: ObjectTrait>(items: &mut [T], id: ObjectId, direction: ZDirection) -> Option<bool> {
    let index = position_of(items, id)?;
    let other = match direction {
        ZDirection::Forward if index + 1 < items.len() => index + 1,
        ZDirection::Backward if index > 0 => index - 1,
        _ => return Some(false),
    };
    items.swap(index, other);
    Some(true)
}

fn topmost_hit<T: ObjectTrait>(items: &[T], point: Point, tolerance: f64) -> Option<ObjectId> {
    items
        .iter()
        .rev()
        .find(|item| item.is_visible() && item.hit_test(point, tolerance))
        .map(ObjectTrait::id)
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of objects across all collections.
    pub fn len(&self) -> usize {
        self.strokes.len()
            + self.texts.len()
            + self.shapes.len()
            + self.images.len()
            + self.notes.len()
            + self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace one field wholesale.
    pub fn set_field(&mut self, field: PageField) {
        match field {
            PageField::Background(background) => self.background = background,
            PageField::Strokes(strokes) => self.strokes = strokes,
            PageField::Texts(texts) => self.texts = texts,
            PageField::Shapes(shapes) => self.shapes = shapes,
            PageField::Images(images) => self.images = images,
            PageField::Notes(notes) => self.notes = notes,
            PageField::Tables(tables) => self.tables = tables,
        }
    }

    /// Find which collection holds `id` and at what index.
    pub fn locate(&self, id: ObjectId) -> Option<(ObjectKind, usize)> {
        if let Some(i) = position_of(&self.strokes, id) {
            return Some((ObjectKind::Stroke, i));
        }
        if let Some(i) = position_of(&self.texts, id) {
            return Some((ObjectKind::Text, i));
        }
        if let Some(i) = position_of(&self.shapes, id) {
            return Some((ObjectKind::Shape, i));
        }
        if let Some(i) = position_of(&self.images, id) {
            return Some((ObjectKind::Image, i));
        }
        if let Some(i) = position_of(&self.notes, id) {
            return Some((ObjectKind::StickyNote, i));
        }
        position_of(&self.tables, id).map(|i| (ObjectKind::Table, i))
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.locate(id).is_some()
    }

    /// A copy of the object with `id`.
    pub fn get_object(&self, id: ObjectId) -> Option<Object> {
        let (kind, i) = self.locate(id)?;
        Some(match kind {
            ObjectKind::Stroke => self.strokes[i].clone().into(),
            ObjectKind::Text => self.texts[i].clone().into(),
            ObjectKind::Shape => self.shapes[i].clone().into(),
            ObjectKind::Image => self.images[i].clone().into(),
            ObjectKind::StickyNote => self.notes[i].clone().into(),
            ObjectKind::Table => self.tables[i].clone().into(),
        })
    }

    /// Append an object on top of its collection.
    pub fn insert(&mut self, object: Object) -> ObjectId {
        let id = object.id();
        match object {
            Object::Stroke(o) => self.strokes.push(o),
            Object::Text(o) => self.texts.push(o),
            Object::Shape(o) => self.shapes.push(o),
            Object::Image(o) => self.images.push(o),
            Object::StickyNote(o) => self.notes.push(o),
            Object::Table(o) => self.tables.push(o),
        }
        id
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<Object> {
        let (kind, i) = self.locate(id)?;
        Some(match kind {
            ObjectKind::Stroke => self.strokes.remove(i).into(),
            ObjectKind::Text => self.texts.remove(i).into(),
            ObjectKind::Shape => self.shapes.remove(i).into(),
            ObjectKind::Image => self.images.remove(i).into(),
            ObjectKind::StickyNote => self.notes.remove(i).into(),
            ObjectKind::Table => self.tables.remove(i).into(),
        })
    }

    /// Run `f` on the object with `id`, keeping its z-order slot.
    ///
    /// Returns false when the object is missing, or when `f` replaced it
    /// with a different variant or id (the change is then discarded).
    pub fn update_object(&mut self, id: ObjectId, f: impl FnOnce(&mut Object)) -> bool {
        let Some((kind, i)) = self.locate(id) else {
            return false;
        };
        let Some(mut object) = self.get_object(id) else {
            return false;
        };
        f(&mut object);
        if object.kind() != kind || object.id() != id {
            log::warn!("Discarding update that changed the identity of object {id}");
            return false;
        }
        match object {
            Object::Stroke(o) => self.strokes[i] = o,
            Object::Text(o) => self.texts[i] = o,
            Object::Shape(o) => self.shapes[i] = o,
            Object::Image(o) => self.images[i] = o,
            Object::StickyNote(o) => self.notes[i] = o,
            Object::Table(o) => self.tables[i] = o,
        }
        true
    }

    pub fn table(&self, id: ObjectId) -> Option<&Table> {
        self.tables.iter().find(|t| t.id() == id)
    }

    pub fn table_mut(&mut self, id: ObjectId) -> Option<&mut Table> {
        self.tables.iter_mut().find(|t| t.id() == id)
    }

    fn collection_len(&self, kind: ObjectKind) -> usize {
        match kind {
            ObjectKind::Stroke => self.strokes.len(),
            ObjectKind::Text => self.texts.len(),
            ObjectKind::Shape => self.shapes.len(),
            ObjectKind::Image => self.images.len(),
            ObjectKind::StickyNote => self.notes.len(),
            ObjectKind::Table => self.tables.len(),
        }
    }

    /// Whether `reorder` would move the object.
    pub fn can_reorder(&self, id: ObjectId, direction: ZDirection) -> bool {
        let Some((kind, index)) = self.locate(id) else {
            return false;
        };
        match direction {
            ZDirection::Forward => index + 1 < self.collection_len(kind),
            ZDirection::Backward => index > 0,
        }
    }

    /// Swap an object with its z-order neighbour inside its collection.
    /// Returns false when it is already at that end or does not exist.
    pub fn reorder(&mut self, id: ObjectId, direction: ZDirection) -> bool {
        let Some((kind, _)) = self.locate(id) else {
            return false;
        };
        let moved = match kind {
            ObjectKind::Stroke => swap_neighbour(&mut self.strokes, id, direction),
            ObjectKind::Text => swap_neighbour(&mut self.texts, id, direction),
            ObjectKind::Shape => swap_neighbour(&mut self.shapes, id, direction),
            ObjectKind::Image => swap_neighbour(&mut self.images, id, direction),
            ObjectKind::StickyNote => swap_neighbour(&mut self.notes, id, direction),
            ObjectKind::Table => swap_neighbour(&mut self.tables, id, direction),
        };
        moved.unwrap_or(false)
    }

    /// Topmost visible object under `point`.
    ///
    /// Eraser strokes are not selectable.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> Option<ObjectId> {
        topmost_hit(&self.tables, point, tolerance)
            .or_else(|| topmost_hit(&self.notes, point, tolerance))
            .or_else(|| topmost_hit(&self.texts, point, tolerance))
            .or_else(|| topmost_hit(&self.images, point, tolerance))
            .or_else(|| topmost_hit(&self.shapes, point, tolerance))
            .or_else(|| {
                self.strokes
                    .iter()
                    .rev()
                    .filter(|s| !s.is_eraser())
                    .find(|s| s.visible && s.hit_test(point, tolerance))
                    .map(ObjectTrait::id)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{ShapeKind, StrokeTool};

    #[test]
    fn test_page_side() {
        assert_eq!(PageSide::of(0), PageSide::Cover);
        assert_eq!(PageSide::of(1), PageSide::Right);
        assert_eq!(PageSide::of(2), PageSide::Left);
        assert_eq!(PageSide::of(7), PageSide::Right);
    }

    #[test]
    fn test_insert_remove() {
        let mut page = Page::new();
        let id = page.insert(Text::new(Point::new(50.0, 50.0), "Hello").into());
        assert_eq!(page.len(), 1);
        assert_eq!(page.locate(id), Some((ObjectKind::Text, 0)));
        let removed = page.remove(id).unwrap();
        assert_eq!(removed.id(), id);
        assert!(page.is_empty());
        assert!(page.remove(id).is_none());
    }

    #[test]
    fn test_update_object_keeps_slot() {
        let mut page = Page::new();
        let a = page.insert(Shape::new(ShapeKind::Rectangle, Point::ZERO).into());
        let b = page.insert(Shape::new(ShapeKind::Circle, Point::ZERO).into());
        assert!(page.update_object(a, |o| o.set_position(Point::new(9.0, 9.0))));
        assert_eq!(page.shapes[0].id(), a);
        assert_eq!(page.shapes[0].position, Point::new(9.0, 9.0));
        assert_eq!(page.shapes[1].id(), b);
    }

    #[test]
    fn test_update_refuses_identity_change() {
        let mut page = Page::new();
        let id = page.insert(Text::new(Point::ZERO, "a").into());
        let before = page.clone();
        assert!(!page.update_object(id, |o| *o = StickyNote::new(Point::ZERO).into()));
        assert!(!page.update_object(id, Object::regenerate_id));
        assert_eq!(page, before);
    }

    #[test]
    fn test_reorder_swaps_neighbour() {
        let mut page = Page::new();
        let a = page.insert(Text::new(Point::ZERO, "a").into());
        let b = page.insert(Text::new(Point::ZERO, "b").into());
        let c = page.insert(Text::new(Point::ZERO, "c").into());
        assert!(page.reorder(a, ZDirection::Forward));
        let order: Vec<_> = page.texts.iter().map(ObjectTrait::id).collect();
        assert_eq!(order, vec![b, a, c]);
        assert!(!page.reorder(c, ZDirection::Forward));
        assert!(page.reorder(c, ZDirection::Backward));
        let order: Vec<_> = page.texts.iter().map(ObjectTrait::id).collect();
        assert_eq!(order, vec![b, c, a]);
    }

    #[test]
    fn test_hit_test_prefers_top_of_render_order() {
        let mut page = Page::new();
        let shape = page.insert(Shape::new(ShapeKind::Rectangle, Point::ZERO).into());
        let text = page.insert(Text::new(Point::new(10.0, 10.0), "on top").into());
        assert_eq!(page.hit_test(Point::new(20.0, 20.0), 0.0), Some(text));
        assert_eq!(page.hit_test(Point::new(90.0, 90.0), 0.0), Some(shape));
        assert_eq!(page.hit_test(Point::new(500.0, 500.0), 0.0), None);
    }

    #[test]
    fn test_hidden_and_eraser_objects_are_not_hit() {
        let mut page = Page::new();
        let mut text = Text::new(Point::ZERO, "hidden");
        text.visible = false;
        page.insert(text.into());
        page.insert(
            Stroke::from_points(
                StrokeTool::Erase,
                vec![Point::new(0.0, 5.0), Point::new(50.0, 5.0)],
            )
            .into(),
        );
        assert_eq!(page.hit_test(Point::new(10.0, 5.0), 2.0), None);
    }

    #[test]
    fn test_set_field() {
        let mut page = Page::new();
        page.set_field(PageField::Background(Some(Background::Solid(
            SerializableColor::white(),
        ))));
        assert_eq!(
            page.background,
            Some(Background::Solid(SerializableColor::white()))
        );
        page.insert(Text::new(Point::ZERO, "x").into());
        page.set_field(PageField::Texts(Vec::new()));
        assert!(page.is_empty());
    }
}

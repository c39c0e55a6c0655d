//! Replays an editing script against a new book and saves the result.

mod script;

use folio_core::Storage;
use folio_core::storage::FileStorage;
use script::{Script, ScriptError, finish, run};
use std::process::ExitCode;

fn replay() -> Result<(), ScriptError> {
    let mut args = std::env::args().skip(1);
    let path = args.next().ok_or(ScriptError::Usage)?;
    let document_id = args.next();

    let script = Script::from_json(&std::fs::read_to_string(&path)?)?;
    log::info!("Replaying {} step(s) from {path}", script.steps.len());

    let mut editor = script.editor();
    run(&mut editor, &script.steps);
    let book = finish(editor);

    let storage = FileStorage::default_location()?;
    let id = document_id.unwrap_or_else(|| book.id.clone());
    pollster::block_on(storage.save(&id, &book))?;
    println!(
        "Saved \"{}\" ({} pages) to {}",
        book.name,
        book.page_count(),
        storage.base_path().join(format!("{id}.json")).display()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting folio-replay");

    match replay() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

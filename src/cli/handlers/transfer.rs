use std::path::Path;

use super::{CmdResult, Context};
use crate::cli::commands::{ExportArgs, ImportArgs};
use crate::io::snapshot_io;

pub(super) fn cmd_export(ctx: &Context, args: ExportArgs) -> CmdResult {
    let board = ctx.read_board()?;
    if args.output == "-" {
        print!("{}", snapshot_io::export_document(&board)?);
        return Ok(());
    }
    let path = Path::new(&args.output);
    snapshot_io::export_to_file(&board, path)?;
    eprintln!(
        "exported {} tasks and {} tags to {}",
        board.tasks.len(),
        board.tags.len(),
        path.display()
    );
    Ok(())
}

/// Replace the whole board with the file's contents. A file that doesn't
/// parse is reported and leaves everything as it was.
pub(super) fn cmd_import(ctx: &Context, args: ImportArgs) -> CmdResult {
    let path = Path::new(&args.path);
    let (tasks, tags) = ctx.mutate_clearing(|board, ui| {
        let imported = snapshot_io::import_from_file(path)?;
        // a filter on a label the new registry lacks would hide everything
        let filter_ok = ui
            .selected_tag
            .as_deref()
            .is_none_or(|tag| imported.tags.contains(tag));
        if !filter_ok {
            ui.selected_tag = None;
        }
        *board = imported;
        Ok((board.tasks.len(), board.tags.len()))
    })?;
    eprintln!(
        "imported {} tasks and {} tags from {}",
        tasks,
        tags,
        path.display()
    );
    Ok(())
}

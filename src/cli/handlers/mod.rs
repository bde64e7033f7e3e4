mod transfer;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::lock::FileLock;
use crate::io::snapshot_io::{self, SavePolicy};
use crate::io::state::{UiState, read_ui_state, write_ui_state};
use crate::io::store::DirStore;
use crate::model::board::Board;
use crate::model::config::Config;
use crate::ops::check;
use crate::ops::comment_ops;
use crate::ops::tag_ops::{self, TagError};
use crate::ops::task_ops::{self, TaskError};
use crate::ops::view::{self, MatchField};

type CmdResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let ctx = Context::open(&cli)?;

    match cli.command {
        // Task commands
        Commands::Add(args) => cmd_add(&ctx, args),
        Commands::List(args) => cmd_list(&ctx, args),
        Commands::Show(args) => cmd_show(&ctx, args),
        Commands::Toggle(args) => cmd_toggle(&ctx, args),
        Commands::Rm(args) => cmd_rm(&ctx, args),
        Commands::Note(args) => cmd_note(&ctx, args),
        Commands::Comment(cmd) => cmd_comment(&ctx, cmd.action),

        // Tags and view state
        Commands::Tag(cmd) => cmd_tag(&ctx, cmd.action),
        Commands::Filter(args) => cmd_filter(&ctx, args),
        Commands::Theme(args) => cmd_theme(&ctx, args),

        // Read-only queries
        Commands::Search(args) => cmd_search(&ctx, args),
        Commands::Check => cmd_check(&ctx),

        // Files
        Commands::Export(args) => transfer::cmd_export(&ctx, args),
        Commands::Import(args) => transfer::cmd_import(&ctx, args),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Everything a command needs that doesn't change while it runs
pub(crate) struct Context {
    data_dir: PathBuf,
    config: Config,
    json: bool,
    no_color: bool,
}

impl Context {
    fn open(cli: &Cli) -> CmdResult<Self> {
        let data_dir = config_io::resolve_data_dir(cli.data_dir.as_deref().map(Path::new));
        std::fs::create_dir_all(&data_dir)
            .map_err(|e| format!("cannot create data directory {}: {}", data_dir.display(), e))?;
        let config = config_io::read_config(&data_dir)?;
        tracing::debug!(data_dir = %data_dir.display(), "opened data directory");
        Ok(Context {
            data_dir,
            config,
            json: cli.json,
            no_color: cli.no_color,
        })
    }

    fn ui_state(&self) -> UiState {
        read_ui_state(&self.data_dir).unwrap_or_default()
    }

    fn painter(&self, ui: &UiState) -> Painter {
        let mode = ui.display_mode_or(self.config.ui.display_mode);
        let color = self.config.ui.color && !self.no_color && std::io::stdout().is_terminal();
        Painter::new(mode, color)
    }

    /// Load the board without taking the lock.
    fn read_board(&self) -> CmdResult<Board> {
        let store = DirStore::open(&self.data_dir)?;
        Ok(snapshot_io::load_snapshot(&store))
    }

    /// Run one state transition under the lock: load, apply `f`, then save.
    ///
    /// Nothing is written when `f` fails. The snapshot is saved only after
    /// the transition has fully applied.
    fn mutate<T>(&self, f: impl FnOnce(&mut Board, &mut UiState) -> CmdResult<T>) -> CmdResult<T> {
        self.mutate_with(self.save_policy(), f)
    }

    /// Like [`Context::mutate`], for transitions that may empty a collection
    /// on purpose. An emptied collection is cleared from the store instead
    /// of being skipped.
    fn mutate_clearing<T>(
        &self,
        f: impl FnOnce(&mut Board, &mut UiState) -> CmdResult<T>,
    ) -> CmdResult<T> {
        self.mutate_with(self.save_policy().clearing(), f)
    }

    fn save_policy(&self) -> SavePolicy {
        SavePolicy::from(&self.config.storage)
    }

    fn mutate_with<T>(
        &self,
        policy: SavePolicy,
        f: impl FnOnce(&mut Board, &mut UiState) -> CmdResult<T>,
    ) -> CmdResult<T> {
        let mut store = DirStore::open(&self.data_dir)?;
        let _lock = FileLock::acquire_default(&self.data_dir)?;

        let mut board = snapshot_io::load_snapshot(&store);
        let mut ui = self.ui_state();
        let ui_before = ui.clone();

        let out = f(&mut board, &mut ui)?;

        snapshot_io::save_snapshot(&mut store, &board, policy)?;
        if ui != ui_before {
            write_ui_state(&self.data_dir, &ui)?;
        }
        Ok(out)
    }

    fn print_json<T: serde::Serialize + ?Sized>(&self, value: &T) -> CmdResult {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

// ---------------------------------------------------------------------------
// Task commands
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &Context, args: AddArgs) -> CmdResult {
    let id = ctx.mutate(|board, _| Ok(task_ops::add_task(&mut board.tasks, &args.text)?))?;
    if ctx.json {
        ctx.print_json(&serde_json::json!({ "id": id }))
    } else {
        println!("{}", id);
        Ok(())
    }
}

fn cmd_list(ctx: &Context, args: ListArgs) -> CmdResult {
    let board = ctx.read_board()?;
    let ui = ctx.ui_state();
    let filter = if args.all {
        None
    } else {
        args.tag.as_deref().or(ui.selected_tag.as_deref())
    };

    let visible = view::visible_tasks(&board.tasks, filter);
    let parts = view::partition(visible);

    if ctx.json {
        return ctx.print_json(&ListJson {
            filter,
            tasks: &parts,
        });
    }
    print_lines(&format_task_list(&parts, filter, &ctx.painter(&ui)));
    Ok(())
}

fn cmd_show(ctx: &Context, args: IdArgs) -> CmdResult {
    let board = ctx.read_board()?;
    let task = task_ops::find_task(&board.tasks, args.id).ok_or(TaskError::NotFound(args.id))?;
    if ctx.json {
        return ctx.print_json(task);
    }
    print_lines(&format_task_detail(task, &ctx.painter(&ctx.ui_state())));
    Ok(())
}

fn cmd_toggle(ctx: &Context, args: IdArgs) -> CmdResult {
    let completed = ctx.mutate(|board, _| Ok(task_ops::toggle_complete(&mut board.tasks, args.id)?))?;
    if ctx.json {
        return ctx.print_json(&serde_json::json!({ "id": args.id, "completed": completed }));
    }
    let verb = if completed { "completed" } else { "reopened" };
    println!("{} {}", verb, args.id);
    Ok(())
}

fn cmd_rm(ctx: &Context, args: IdArgs) -> CmdResult {
    let removed =
        ctx.mutate_clearing(|board, _| Ok(task_ops::delete_task(&mut board.tasks, args.id)?))?;
    if ctx.json {
        return ctx.print_json(&serde_json::json!({ "id": removed.id, "text": removed.text }));
    }
    println!("deleted {} {}", removed.id, removed.text);
    Ok(())
}

fn cmd_note(ctx: &Context, args: NoteArgs) -> CmdResult {
    ctx.mutate(|board, _| Ok(task_ops::update_notes(&mut board.tasks, args.id, &args.text)?))
}

fn cmd_comment(ctx: &Context, action: CommentAction) -> CmdResult {
    match action {
        CommentAction::Add { id, text } => {
            let comment_id =
                ctx.mutate(|board, _| Ok(comment_ops::add_comment(&mut board.tasks, id, &text)?))?;
            if ctx.json {
                return ctx.print_json(&serde_json::json!({ "task": id, "id": comment_id }));
            }
            println!("{}", comment_id);
        }
        CommentAction::Edit {
            id,
            comment_id,
            text,
        } => {
            ctx.mutate(|board, _| {
                Ok(comment_ops::edit_comment(&mut board.tasks, id, comment_id, &text)?)
            })?;
        }
        CommentAction::Rm { id, comment_id } => {
            ctx.mutate(|board, _| {
                Ok(comment_ops::delete_comment(&mut board.tasks, id, comment_id)?)
            })?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tags and view state
// ---------------------------------------------------------------------------

fn cmd_tag(ctx: &Context, action: TagAction) -> CmdResult {
    match action {
        TagAction::List => {
            let board = ctx.read_board()?;
            let ui = ctx.ui_state();
            if ctx.json {
                return ctx.print_json(&board.tags);
            }
            print_lines(&format_tag_list(
                board.tags.iter(),
                ui.selected_tag.as_deref(),
                &ctx.painter(&ui),
            ));
        }
        TagAction::Create { label } => {
            ctx.mutate(|board, _| Ok(tag_ops::create_tag(&mut board.tags, &label)?))?;
        }
        TagAction::Delete { label } => {
            ctx.mutate_clearing(|board, ui| {
                Ok(tag_ops::delete_tag(board, &label, &mut ui.selected_tag)?)
            })?;
        }
        TagAction::Attach { id, label } => {
            ctx.mutate(|board, _| {
                Ok(task_ops::append_tag(&mut board.tasks, &board.tags, id, &label)?)
            })?;
        }
        TagAction::Detach { id, label } => {
            ctx.mutate(|board, _| Ok(task_ops::remove_tag(&mut board.tasks, id, &label)?))?;
        }
        TagAction::Set { id, labels } => {
            ctx.mutate(|board, _| {
                Ok(task_ops::replace_tags(&mut board.tasks, &board.tags, id, &labels)?)
            })?;
        }
    }
    Ok(())
}

fn cmd_filter(ctx: &Context, args: FilterArgs) -> CmdResult {
    ctx.mutate(|board, ui| {
        ui.selected_tag = match args.label {
            Some(label) if !args.clear => {
                if !board.tags.contains(&label) {
                    return Err(TagError::NotFound(label).into());
                }
                Some(label)
            }
            _ => None,
        };
        Ok(())
    })
}

fn cmd_theme(ctx: &Context, args: ThemeArgs) -> CmdResult {
    let mode = ctx.mutate(|_, ui| {
        let current = ui.display_mode_or(ctx.config.ui.display_mode);
        let next = args.mode.unwrap_or_else(|| current.toggled());
        ui.display_mode = Some(next);
        Ok(next)
    })?;
    if ctx.json {
        return ctx.print_json(&serde_json::json!({ "display_mode": mode }));
    }
    println!("{}", mode);
    Ok(())
}

// ---------------------------------------------------------------------------
// Read-only queries
// ---------------------------------------------------------------------------

fn cmd_search(ctx: &Context, args: SearchArgs) -> CmdResult {
    let re = Regex::new(&args.pattern)
        .map_err(|e| format!("invalid regex '{}': {}", args.pattern, e))?;
    let board = ctx.read_board()?;
    let hits = view::search_tasks(&board.tasks, &re);

    let texts: Vec<&str> = hits
        .iter()
        .map(|hit| {
            let task = task_ops::find_task(&board.tasks, hit.task_id);
            match (task, hit.field, hit.comment_id) {
                (Some(t), MatchField::Text, _) => t.text.as_str(),
                (Some(t), MatchField::Notes, _) => t.notes.as_str(),
                (Some(t), MatchField::Comment, Some(cid)) => {
                    t.find_comment(cid).map(|c| c.text.as_str()).unwrap_or("")
                }
                _ => "",
            }
        })
        .collect();

    if ctx.json {
        let out: Vec<SearchHitJson> = hits
            .iter()
            .zip(&texts)
            .map(|(hit, &text)| SearchHitJson { hit, text })
            .collect();
        return ctx.print_json(&out);
    }

    if hits.is_empty() {
        println!("No matches.");
        return Ok(());
    }
    let painter = ctx.painter(&ctx.ui_state());
    for (hit, &text) in hits.iter().zip(&texts) {
        println!("{}", format_search_hit(hit, text, &painter));
    }
    Ok(())
}

fn cmd_check(ctx: &Context) -> CmdResult {
    let board = ctx.read_board()?;
    let result = check::check_board(&board);
    if ctx.json {
        return ctx.print_json(&result);
    }
    print_lines(&format_check(&result, &ctx.painter(&ctx.ui_state())));
    Ok(())
}

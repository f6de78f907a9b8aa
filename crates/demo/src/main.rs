use std::cell::{Cell, RefCell};
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use std::rc::Rc;

use anyhow::{Context, Result, bail};
use argmatch::{MatchError, MatchOutcome, Matcher, Value, handler};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

/// Cross-cutting values collected by the shared session handler before
/// the matched action runs.
#[derive(Default)]
struct Session {
    verbose: Cell<bool>,
    defines: RefCell<Vec<(String, Option<String>)>>,
}

impl Session {
    /// Replaces `{name}` with the define's value throughout `text`.
    fn apply_defines(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (name, value) in self.defines.borrow().iter() {
            out = out.replace(&format!("{{{name}}}"), value.as_deref().unwrap_or(""));
        }
        out
    }
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();
    run(&args)
}

fn run(args: &[String]) -> Result<ExitCode> {
    let session = Rc::new(Session::default());
    let mut matcher = build_matcher(&session);
    match matcher.process(args, false) {
        Ok(MatchOutcome::Done(action)) => {
            action?;
            Ok(ExitCode::SUCCESS)
        }
        Ok(MatchOutcome::Help(text)) => {
            println!("{text}");
            Ok(ExitCode::SUCCESS)
        }
        Err(MatchError::Usage(problem)) => {
            eprintln!("{problem}");
            Ok(ExitCode::FAILURE)
        }
        Err(MatchError::Setup(bug)) => Err(bug.into()),
    }
}

/// The toolkit picks its action from the shape of the arguments alone:
/// `--src`/`--dst` copy a file, adding `--move` renames instead, and bare
/// paths print file contents. A shared handler collects `--verbose` and
/// repeated `-D name=value` defines for whichever action matches.
fn build_matcher(session: &Rc<Session>) -> Matcher<Result<()>> {
    let session_state = session.clone();
    let copy_state = session.clone();
    let move_state = session.clone();
    let show_state = session.clone();
    Matcher::new()
        .alias("v", "verbose")
        .alias("D", "define")
        .option_help("verbose", "reports each completed operation on stderr")
        .option_help("define", "substitutes {NAME} with VALUE in copied text")
        .option_help("src", "the file to copy or rename")
        .option_help("dst", "where the file ends up")
        .option_help("overwrite", "replaces dst when it already exists")
        .option_help("move", "renames src instead of copying it")
        .var_name("define", "NAME=VALUE")
        .shared(
            handler("session")
                .param_default("verbose", false)
                .param_default("defines", Value::None)
                .flags("verbose")
                .prefixes("defines as define"),
            move |inv| {
                session_state.verbose.set(inv.get_flag("verbose"));
                session_state
                    .defines
                    .borrow_mut()
                    .extend(inv.get_pairs("defines").unwrap_or_default().iter().cloned());
            },
        )
        .alternative(
            handler("copy")
                .params(["src", "dst"])
                .param_default("overwrite", false)
                .path_options("src, dst")
                .flags("overwrite")
                .doc("Copies src to dst, applying defines to the copied text."),
            move |inv| {
                copy_file(
                    &copy_state,
                    Path::new(inv.get_str("src").unwrap_or_default()),
                    Path::new(inv.get_str("dst").unwrap_or_default()),
                    inv.get_flag("overwrite"),
                )
            },
        )
        .alternative(
            handler("move")
                .params(["src", "dst"])
                .path_options("src, dst")
                .flags("move")
                .doc("Renames src to dst, selected by the --move flag."),
            move |inv| {
                move_file(
                    &move_state,
                    Path::new(inv.get_str("src").unwrap_or_default()),
                    Path::new(inv.get_str("dst").unwrap_or_default()),
                )
            },
        )
        .alternative(
            handler("show")
                .param("path")
                .var_positional()
                .doc("Prints each named file to stdout."),
            move |inv| {
                let paths: Vec<String> = inv
                    .values()
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect();
                show_files(&show_state, &paths)
            },
        )
}

fn copy_file(session: &Session, src: &Path, dst: &Path, overwrite: bool) -> Result<()> {
    debug!(src = %src.display(), dst = %dst.display(), overwrite, "executing copy");
    if dst.exists() && !overwrite {
        bail!(
            "{} already exists; pass --overwrite to replace it",
            dst.display()
        );
    }
    let text =
        fs::read_to_string(src).with_context(|| format!("failed to read {}", src.display()))?;
    fs::write(dst, session.apply_defines(&text))
        .with_context(|| format!("failed to write {}", dst.display()))?;
    if session.verbose.get() {
        eprintln!("Copied: {} -> {}", src.display(), dst.display());
    }
    Ok(())
}

fn move_file(session: &Session, src: &Path, dst: &Path) -> Result<()> {
    debug!(src = %src.display(), dst = %dst.display(), "executing move");
    if dst.exists() {
        bail!("{} already exists", dst.display());
    }
    fs::rename(src, dst)
        .with_context(|| format!("failed to move {} to {}", src.display(), dst.display()))?;
    if session.verbose.get() {
        eprintln!("Moved: {} -> {}", src.display(), dst.display());
    }
    Ok(())
}

fn show_files(session: &Session, paths: &[String]) -> Result<()> {
    debug!(files = paths.len(), "executing show");
    for path in paths {
        if session.verbose.get() {
            eprintln!("Showing: {path}");
        }
        let text = fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
        print!("{text}");
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

use anyhow::{Context, Result};
use clap::Parser;

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};

use voicescript::command::commands;
use voicescript::transcript::read_fragments;
use voicescript::{Opts, OutputType, RecordingSession, ScriptedRecognizer, SessionEndPolicy};

fn main() -> Result<()> {
    voicescript::init_logging();
    let params = Params::parse();

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());

    if params.list_commands {
        for cmd in commands() {
            writeln!(writer, "{:<16}{}", cmd.prefix, cmd.description)?;
        }
        writer.flush()?;
        return Ok(());
    }

    let path = params
        .transcript_path
        .as_deref()
        .context("--transcript is required unless --list-commands is given")?;
    let fragments = read_fragments(open_input(path)?)
        .with_context(|| format!("failed to read transcript '{path}'"))?;

    let opts = Opts {
        session_end_policy: if params.discard_interim {
            SessionEndPolicy::Discard
        } else {
            SessionEndPolicy::Finalize
        },
        enable_control_commands: params.control_commands,
        output_type: params.output_type,
    };

    let mut session = RecordingSession::new(ScriptedRecognizer::new(fragments), opts);
    session.start().context("failed to start recording session")?;
    session.pump();
    session.stop();

    session.encode(&mut writer)?;
    if ends_without_newline(params.output_type) {
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}

/// The text layout already ends every line; JSON is a single unterminated object.
fn ends_without_newline(output_type: OutputType) -> bool {
    output_type == OutputType::Json
}

#[derive(Parser, Debug)]
#[command(name = "voicescript")]
#[command(about = "Replay a recorded dictation transcript into a screenplay")]
struct Params {
    /// JSON Lines transcript of `{"text", "isFinal"}` fragments (`-` for stdin).
    #[arg(short = 't', long = "transcript")]
    pub transcript_path: Option<String>,

    #[arg(
        short = 'o',
        long = "output-type",
        value_enum,
        default_value_t = OutputType::Json
    )]
    pub output_type: OutputType,

    /// Drop trailing interim text instead of committing it when the transcript ends.
    #[arg(long = "discard-interim", default_value_t = false)]
    pub discard_interim: bool,

    /// Let control phrases such as "delete last line" edit the document.
    #[arg(long = "control-commands", default_value_t = false)]
    pub control_commands: bool,

    /// Print the spoken command prefixes and exit.
    #[arg(long = "list-commands", default_value_t = false)]
    pub list_commands: bool,
}

fn open_input(path: &str) -> Result<Box<dyn BufRead>> {
    if path == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(path).with_context(|| format!("failed to open '{path}'"))?;
    Ok(Box::new(BufReader::new(file)))
}

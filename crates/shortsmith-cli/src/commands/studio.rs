//! Interactive studio session

use anyhow::Result;
use shortsmith_gen::{AspectRatio, CancelToken, ImageCount};
use shortsmith_studio::{Outcome, ScriptField, Studio, StudioView};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use super::{open_studio, resolve_style, status_printer, ProjectArgs};

const HELP: &str = "\
Commands:
  show                      Show the script and assets
  run [topic]               Generate everything (optionally for a new topic)
  edit <field> <text>       Edit title, hook, body or conclusion
  prompt <n> <text>         Replace the text of image prompt n
  regen <n>                 Regenerate image n
  narrate                   Regenerate the narration
  video [dir]               Composite the final video and save it
  export [dir]              Write the zip archive
  set <setting> <value>     Change topic, count, aspect, style or music
  help                      Show this help
  quit                      Leave the studio";

/// A parsed studio command. Image numbers are 1-based on input and
/// converted to indices here.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Show,
    Run(Option<String>),
    Edit(ScriptField, String),
    Prompt(usize, String),
    Regen(usize),
    Narrate,
    Video(PathBuf),
    Export(PathBuf),
    Set(Setting),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Setting {
    Topic(String),
    Count(ImageCount),
    Aspect(AspectRatio),
    Style(String),
    Music(String),
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    }
}

fn parse_image_number(text: &str) -> std::result::Result<usize, String> {
    match text.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("'{}' is not an image number (1, 2, ...)", text)),
    }
}

fn dir_or_current(text: &str) -> PathBuf {
    if text.is_empty() {
        PathBuf::from(".")
    } else {
        PathBuf::from(text)
    }
}

fn parse_setting(input: &str) -> std::result::Result<Setting, String> {
    let (name, value) = split_word(input);
    if value.is_empty() {
        return Err("Usage: set <topic|count|aspect|style|music> <value>".to_string());
    }
    match name {
        "topic" => Ok(Setting::Topic(value.to_string())),
        "count" => value.parse().map(Setting::Count).map_err(|e| e.to_string()),
        "aspect" => value.parse().map(Setting::Aspect).map_err(|e| e.to_string()),
        "style" => Ok(Setting::Style(value.to_string())),
        "music" => Ok(Setting::Music(value.to_string())),
        other => Err(format!("Unknown setting '{}'", other)),
    }
}

fn parse_command(line: &str) -> std::result::Result<Command, String> {
    let (word, rest) = split_word(line);
    match word {
        "show" | "" => Ok(Command::Show),
        "run" => Ok(Command::Run(if rest.is_empty() {
            None
        } else {
            Some(rest.to_string())
        })),
        "edit" => {
            let (field, text) = split_word(rest);
            let field: ScriptField = field.parse().map_err(|e: shortsmith_core::ShortsError| e.to_string())?;
            Ok(Command::Edit(field, text.to_string()))
        }
        "prompt" => {
            let (number, text) = split_word(rest);
            if text.is_empty() {
                return Err("Usage: prompt <n> <text>".to_string());
            }
            Ok(Command::Prompt(parse_image_number(number)?, text.to_string()))
        }
        "regen" => Ok(Command::Regen(parse_image_number(rest)?)),
        "narrate" => Ok(Command::Narrate),
        "video" => Ok(Command::Video(dir_or_current(rest))),
        "export" => Ok(Command::Export(dir_or_current(rest))),
        "set" => Ok(Command::Set(parse_setting(rest)?)),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(format!("Unknown command '{}'. Type 'help' for a list", other)),
    }
}

fn report<T>(outcome: Outcome<T>) {
    if let Some(msg) = outcome.message() {
        println!("  {}", msg);
    }
}

fn execute(studio: &mut Studio, command: Command) {
    match command {
        Command::Show => print!("{}", StudioView::project(studio.state()).render_text()),
        Command::Run(topic) => {
            if let Some(topic) = topic {
                studio.update_settings(|s| s.topic = topic);
            }
            match studio.run() {
                Outcome::Done(summary) => {
                    println!(
                        "  '{}': {}/{} images, narration {}",
                        summary.title,
                        summary.images_stored,
                        summary.prompts,
                        if summary.narration { "ready" } else { "missing" }
                    );
                }
                other => report(other),
            }
        }
        Command::Edit(field, text) => report(studio.edit_field(field, &text)),
        Command::Prompt(index, text) => report(studio.edit_prompt(index, &text)),
        Command::Regen(index) => report(studio.regenerate_image(index)),
        Command::Narrate => report(studio.regenerate_audio()),
        Command::Video(dir) => match studio.composite(&CancelToken::new()) {
            Outcome::Done(()) => match studio.save_final_video(&dir) {
                Outcome::Done(path) => println!("  Saved {}", path.display()),
                other => report(other),
            },
            other => report(other),
        },
        Command::Export(dir) => match studio.export_archive(&dir) {
            Outcome::Done(path) => println!("  Exported {}", path.display()),
            other => report(other),
        },
        Command::Set(setting) => {
            studio.update_settings(|s| match setting {
                Setting::Topic(topic) => s.topic = topic,
                Setting::Count(count) => s.image_count = count,
                Setting::Aspect(ratio) => s.aspect_ratio = ratio,
                Setting::Style(name) => s.style = resolve_style(&name),
                Setting::Music(music) => s.music = music,
            });
            println!("  {}", StudioView::project(studio.state()).settings_line);
        }
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
}

pub fn run(provider: Option<&str>, topic: Option<String>, project: &ProjectArgs) -> Result<()> {
    let mut studio = open_studio(provider, topic.as_deref().unwrap_or_default(), project)?;
    studio.subscribe(status_printer());

    println!("Shortsmith studio ({}). Type 'help' for commands.", studio.service_name());
    if topic.is_some() {
        execute(&mut studio, Command::Run(None));
    }

    let stdin = io::stdin();
    loop {
        print!("shortsmith> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => execute(&mut studio, command),
            Err(msg) => println!("  {}", msg),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_image_commands_are_one_based() {
        assert_eq!(parse_command("regen 1").unwrap(), Command::Regen(0));
        assert_eq!(
            parse_command("prompt 3   a snowy street  ").unwrap(),
            Command::Prompt(2, "a snowy street".to_string())
        );
        assert!(parse_command("regen 0").is_err());
        assert!(parse_command("regen x").is_err());
        assert!(parse_command("prompt 2").is_err());
    }

    #[test]
    fn test_parse_edit() {
        assert_eq!(
            parse_command("edit hook Did you know?").unwrap(),
            Command::Edit(ScriptField::Hook, "Did you know?".to_string())
        );
        assert!(parse_command("edit summary nope").is_err());
    }

    #[test]
    fn test_parse_set() {
        assert_eq!(
            parse_command("set count auto").unwrap(),
            Command::Set(Setting::Count(ImageCount::Auto))
        );
        assert_eq!(
            parse_command("set aspect 16:9").unwrap(),
            Command::Set(Setting::Aspect(AspectRatio::Landscape16x9))
        );
        assert_eq!(
            parse_command("set topic 겨울철 별미").unwrap(),
            Command::Set(Setting::Topic("겨울철 별미".to_string()))
        );
        assert!(parse_command("set count 21").is_err());
        assert!(parse_command("set volume 11").is_err());
        assert!(parse_command("set music").is_err());
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(parse_command("").unwrap(), Command::Show);
        assert_eq!(parse_command("run").unwrap(), Command::Run(None));
        assert_eq!(
            parse_command("run Summer drinks").unwrap(),
            Command::Run(Some("Summer drinks".to_string()))
        );
        assert_eq!(parse_command("export").unwrap(), Command::Export(PathBuf::from(".")));
        assert_eq!(parse_command("video out").unwrap(), Command::Video(PathBuf::from("out")));
        assert_eq!(parse_command("q").unwrap(), Command::Quit);
        assert!(parse_command("dance").is_err());
    }
}

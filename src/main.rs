use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::info;

use gym_2048::config::{GameConfig, RewardMode};
use gym_2048::engine::Move;
use gym_2048::env::Env2048;

#[derive(Debug, Parser)]
#[command(name = "gym-2048", version, about = "Play 2048 in the terminal")]
struct Args {
    /// JSON config file; flags below override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Board side length
    #[arg(long)]
    size: Option<usize>,

    /// Seed for tile spawns (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Probability that a spawned tile is a 4
    #[arg(long)]
    four_probability: Option<f64>,

    /// Reward reported for each step
    #[arg(long, value_enum)]
    reward: Option<RewardMode>,

    /// Print every step as a JSON line instead of the board
    #[arg(long)]
    json: bool,
}

impl Args {
    fn game_config(&self) -> Result<GameConfig> {
        let mut cfg = match &self.config {
            Some(path) => GameConfig::from_path(path)?,
            None => GameConfig::default(),
        };
        if let Some(size) = self.size {
            cfg.size = size;
        }
        if let Some(p) = self.four_probability {
            cfg.four_probability = p;
        }
        if let Some(reward) = self.reward {
            cfg.reward = reward;
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cfg = args.game_config()?;
    info!("starting {n}x{n} game, reward={:?}", cfg.reward, n = cfg.size);
    let mut env = Env2048::new(&cfg)?;

    let stdin = io::stdin();
    let mut console = Console {
        out: io::stdout().lock(),
        err: io::stderr().lock(),
        json: args.json,
    };
    play(&mut env, stdin.lock(), &mut console)
}

/// Where the loop writes. In JSON mode stdout carries only step objects,
/// one per line, and everything meant for a human goes to `err`.
struct Console<O, E> {
    out: O,
    err: E,
    json: bool,
}

impl<O: Write, E: Write> Console<O, E> {
    fn human(&mut self) -> &mut dyn Write {
        if self.json {
            &mut self.err
        } else {
            &mut self.out
        }
    }

    fn say(&mut self, text: &str) -> io::Result<()> {
        let w = self.human();
        writeln!(w, "{text}")
    }
}

fn play<B: BufRead, O: Write, E: Write>(
    env: &mut Env2048,
    input: B,
    console: &mut Console<O, E>,
) -> Result<()> {
    let mut lines = input.lines();
    loop {
        if !console.json {
            console.say("--------------------------------------------------------")?;
            write!(console.out, "{}", env.render())?;
        }
        let w = console.human();
        write!(w, "Enter a direction or quit: ")?;
        w.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        if line.trim().eq_ignore_ascii_case("quit") {
            console.say("Thanks for playing!")?;
            break;
        }
        let Ok(direction) = line.parse::<Move>() else {
            console.say("invalid input, try again.")?;
            continue;
        };

        let step = env.step(direction.index())?;
        if console.json {
            writeln!(console.out, "{}", serde_json::to_string(&step)?)?;
        }
        if step.terminated {
            console.say("Game Over")?;
            let board = env.render();
            write!(console.human(), "{board}")?;
            break;
        }
    }
    console.out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(json: bool, input: &str) -> (String, String) {
        let cfg = GameConfig {
            seed: Some(4),
            ..GameConfig::default()
        };
        let mut env = Env2048::new(&cfg).unwrap();
        let mut console = Console {
            out: Vec::new(),
            err: Vec::new(),
            json,
        };
        play(&mut env, Cursor::new(input), &mut console).unwrap();
        (
            String::from_utf8(console.out).unwrap(),
            String::from_utf8(console.err).unwrap(),
        )
    }

    #[test]
    fn json_mode_stdout_is_only_json_lines() {
        let (out, err) = run(true, "L\nbogus\nU\nR\nquit\n");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in lines {
            let step: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(step["observation"]["board"].as_array().unwrap().len(), 16);
        }
        assert!(err.contains("Enter a direction or quit: "));
        assert!(err.contains("invalid input, try again."));
        assert!(err.contains("Thanks for playing!"));
    }

    #[test]
    fn interactive_mode_prints_board_and_prompt() {
        let (out, err) = run(false, "x\nquit\n");
        assert!(out.contains("Score: 0"));
        assert!(out.contains("Enter a direction or quit: "));
        assert!(out.contains("invalid input, try again."));
        assert!(out.ends_with("Thanks for playing!\n"));
        assert!(err.is_empty());
    }

    #[test]
    fn end_of_input_stops_the_loop() {
        let (out, _) = run(true, "D\n");
        assert_eq!(out.lines().count(), 1);
    }
}

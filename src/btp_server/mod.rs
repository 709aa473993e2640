mod options;

use std::process::exit;

use itertools::Itertools;
pub use options::BTPServerOptions;

use crate::prelude::*;

/// The breach text protocol server: one command per line on stdin, replies
/// on stdout, each exchange closed by an `ok` footer.
pub struct BTPServer {
    agent: BreachAgent,
    #[allow(dead_code)]
    config: BTPServerOptions,
    started: bool,
    dirty: bool,
}

impl BTPServer {
    /// Produces a new BTP server with the given breach engine configuration.
    pub fn new(options: BTPServerOptions) -> BTPServer {
        BTPServer {
            agent: options.agent_config().get_agent(),
            config: options,
            started: false,
            dirty: true,
        }
    }

    /// Runs breach in engine mode until stdin closes or `quit` arrives.
    pub fn run(&mut self) -> Result<()> {
        loop
        {
            let mut cmdstr: String = String::new();
            if std::io::stdin().read_line(&mut cmdstr)? == 0 {
                return Ok(());
            }

            let args: Vec<&str> = cmdstr.split_whitespace().filter(|s| !s.is_empty()).collect();
            let cmd = *args.first().unwrap_or(&"");

            self.apply(cmd, args.get(1..).unwrap_or(&[]))?;
        }
    }

    /// Runs a command.
    fn apply(&mut self, cmd: &str, args: &[&str]) -> Result<()> {
        let result = match cmd
        {
            | "" => Ok(()),
            | "bestmove" => self.best_move(args),
            | "info" => self.info(),
            | "newgame" => self.new_game(args),
            | "play" => self.play_move(args),
            | "quit" => exit(0),
            | "state" => self.show_state(args),
            | "undo" => self.undo_move(args),
            | "validmoves" => self.valid_moves(args),
            | _ => Err(anyhow!("unrecognized command {cmd}")),
        };

        match result
        {
            Ok(_) => {
                log::debug!("Command completed successfully: {cmd} {}", args.join(" "));
                self.ok()
            },
            Err(err) => {
                log::warn!("encountered recoverable error:\n{err}");
                self.err(&err)
            },
        }
    }

    fn best_move(&mut self, args: &[&str]) -> Result<()> {
        self.ensure_started()?;

        if args.len() >= 2 {
            match args[0] {
                "time"       => {
                    let time = args[1].parse::<u32>()?;
                    self.agent.set_max_time(time);
                },
                "difficulty" => {
                    let level = args[1].parse::<u32>()?;
                    self.agent.set_difficulty(level);
                },
                _            => { return Err(anyhow!("unrecognized search option {}", args[0])); }
            };
        }
        let action = self.agent.generate_move();
        self.dirty = false;

        println!("{}", notate_move(action));
        Ok(())
    }

    /// Starts a new game, from the standard deal or a provided state string.
    fn new_game(&mut self, args: &[&str]) -> Result<()> {
        let state = if !args.is_empty() {
            Some(args[0].parse::<StateString>()?.state)
        } else {
            None
        };

        self.agent.new_game(state);
        self.started = true;
        self.dirty = true;

        println!("{}", self.agent.state().notate());
        Ok(())
    }

    fn play_move(&mut self, args: &[&str]) -> Result<()> {
        self.ensure_started()?;

        if args.is_empty() {
            return Err(anyhow!("no move provided"));
        }

        let MoveString { repr: _, action } = args[0].parse::<MoveString>()?;
        self.agent.play(action)?;
        self.dirty = true;

        println!("{}", self.agent.state().notate());
        Ok(())
    }

    fn show_state(&mut self, _args: &[&str]) -> Result<()> {
        self.ensure_started()?;

        println!("{}", self.agent.state().notate());
        Ok(())
    }

    fn undo_move(&mut self, _args: &[&str]) -> Result<()> {
        self.ensure_started()?;

        self.agent.undo()?;
        self.dirty = true;

        println!("{}", self.agent.state().notate());
        Ok(())
    }

    fn valid_moves(&mut self, _args: &[&str]) -> Result<()> {
        self.ensure_started()?;

        let state = self.agent.state();
        let moves = state.valid_moves(state.to_move);
        let movestr = moves.iter().map(|&mv| notate_move(Some(mv))).join("; ");

        println!("{}", moves.len());
        println!("{}", movestr);
        Ok(())
    }

    // accessors

    fn ensure_started(&mut self) -> Result<()> {
        if self.started {
            Ok(())
        } else {
            Err(anyhow!("no game in progress"))
        }
    }

    // basic printers

    /// Prints the server's ID.
    fn info(&self) -> Result<()>
    {
        println!(
            "id {} v{}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        );
        Ok(())
    }

    /// Prints an error to the BTP stream.
    fn err(&self, err: &Error) -> Result<()>
    {
        println!("err\n{}", err);
        self.ok()
    }

    /// Prints the ok footer to the BTP stream.
    fn ok(&self) -> Result<()>
    {
        println!("ok");
        Ok(())
    }
}

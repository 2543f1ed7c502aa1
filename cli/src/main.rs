use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tictactoe_engine::{
    Difficulty, GameMode, GameSession, GameStatus, Mark, ScoreStore, ScoringMode, SessionSettings,
    log, logger,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    /// Two humans sharing the terminal.
    #[value(name = "2p")]
    TwoPlayer,
    /// Play against the built-in opponent.
    Bot,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DifficultyArg {
    Easy,
    Medium,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(arg: DifficultyArg) -> Self {
        match arg {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Medium => Difficulty::Medium,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ScoringArg {
    /// Keep playing until the board fills; every new line scores.
    Multi,
    /// First completed line ends the game.
    Single,
}

impl From<ScoringArg> for ScoringMode {
    fn from(arg: ScoringArg) -> Self {
        match arg {
            ScoringArg::Multi => ScoringMode::ContinuousMultiWin,
            ScoringArg::Single => ScoringMode::SingleWinner,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MarkArg {
    X,
    O,
}

impl From<MarkArg> for Mark {
    fn from(arg: MarkArg) -> Self {
        match arg {
            MarkArg::X => Mark::X,
            MarkArg::O => Mark::O,
        }
    }
}

#[derive(Parser)]
#[command(name = "tictactoe_cli", about = "Multi-size tic-tac-toe in the terminal")]
struct Args {
    /// Board side length.
    #[arg(long, default_value_t = 3)]
    board_size: usize,

    #[arg(long, value_enum, default_value = "2p")]
    mode: ModeArg,

    /// Bot strength; only used with --mode bot.
    #[arg(long, value_enum, default_value = "easy")]
    difficulty: DifficultyArg,

    #[arg(long, value_enum, default_value = "multi")]
    scoring: ScoringArg,

    /// Which mark the bot plays; only used with --mode bot.
    #[arg(long, value_enum, default_value = "o")]
    bot_mark: MarkArg,

    #[arg(long, default_value = "Player X")]
    player_x: String,

    #[arg(long, default_value = "Player O")]
    player_o: String,

    /// Where the scoreboard is kept between runs.
    #[arg(long, default_value = "ttt_scores.yaml")]
    scores_file: PathBuf,

    /// Fixes the session's random decisions, for reproducible games.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    use_log_prefix: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let prefix = if args.use_log_prefix {
        Some("TicTacToe")
    } else {
        None
    };
    logger::init_logger(prefix);

    let mode = match args.mode {
        ModeArg::TwoPlayer => GameMode::TwoPlayer,
        ModeArg::Bot => GameMode::VsBot {
            difficulty: args.difficulty.into(),
            bot_mark: args.bot_mark.into(),
        },
    };

    let mut settings = SessionSettings::new(args.board_size, mode);
    settings.scoring = args.scoring.into();
    settings.seed = args.seed;
    settings.names.x = args.player_x.clone();
    settings.names.o = args.player_o.clone();
    if mode.bot_mark() == Some(Mark::X) {
        settings.names.x = "Bot".to_string();
    } else if mode.bot_mark() == Some(Mark::O) {
        settings.names.o = "Bot".to_string();
    }

    let store = Arc::new(ScoreStore::yaml_file(&args.scores_file));
    let session = GameSession::start(settings, store)?;

    println!(
        "Enter a cell index (0..{}) or `row col`; r restarts, s resets scores, q quits.",
        session.board_size() * session.board_size() - 1
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    run(&session, &mut lines).await?;

    log!("Goodbye.");
    Ok(())
}

async fn run(
    session: &GameSession,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        wait_for_bot(session).await;
        report_new_lines(session).await;
        print_board(session).await;

        if session.is_terminal().await {
            print_outcome(session).await;
            print!("[r]estart or [q]uit > ");
            std::io::stdout().flush()?;

            match lines.next_line().await? {
                Some(line) if line.trim().eq_ignore_ascii_case("r") => {
                    session.restart().await;
                    continue;
                }
                _ => return Ok(()),
            }
        }

        let mark = session.current_mark().await;
        print!("{} ({}) > ", session.settings().names.of(mark), mark);
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        let input = line.trim();

        match input {
            "" => {}
            "q" | "quit" => return Ok(()),
            "r" => session.restart().await,
            "s" => {
                session.reset_scores();
                print_scores(session);
            }
            _ => match parse_cell(input, session.board_size()) {
                Some(index) => {
                    if let Err(e) = session.submit_move(index).await {
                        println!("Move rejected: {}", e);
                    }
                }
                None => println!("Could not read a cell from {:?}", input),
            },
        }
    }
}

/// Accepts either a flat cell index or a `row col` pair.
fn parse_cell(input: &str, board_size: usize) -> Option<usize> {
    let fields: Vec<&str> = input.split_whitespace().collect();
    match fields.as_slice() {
        [index] => index.parse().ok(),
        [row, col] => {
            let row: usize = row.parse().ok()?;
            let col: usize = col.parse().ok()?;
            Some(row * board_size + col)
        }
        _ => None,
    }
}

/// The bot replies on its own schedule; poll until the turn comes back
/// around or the game ends.
async fn wait_for_bot(session: &GameSession) {
    let Some(bot_mark) = session.settings().mode.bot_mark() else {
        return;
    };
    while !session.is_terminal().await && session.current_mark().await == bot_mark {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

async fn report_new_lines(session: &GameSession) {
    let lines = session.winning_lines_found().await;
    if lines.is_empty() {
        return;
    }

    let names = &session.settings().names;
    for line in &lines {
        let (start, end) = line.endpoints(session.board_size());
        println!(
            "{} ({}) completes ({},{})-({},{}) and scores!",
            names.of(line.winner),
            line.winner,
            start.row,
            start.col,
            end.row,
            end.col
        );
    }
    print_scores(session);
}

async fn print_board(session: &GameSession) {
    let size = session.board_size();
    let cells = session.board_cells().await;

    print!("\n   ");
    for col in 0..size {
        print!("{:>3}", col);
    }
    println!();
    for row in 0..size {
        print!("{:>3}", row);
        for col in 0..size {
            print!("{:>3}", cells[row * size + col]);
        }
        println!();
    }
    println!();
}

fn print_scores(session: &GameSession) {
    let scores = session.scores();
    let names = &session.settings().names;
    println!(
        "Scores: {} {} - {} {} - draws {}",
        names.of(Mark::X),
        scores.x,
        names.of(Mark::O),
        scores.o,
        scores.draws
    );
}

async fn print_outcome(session: &GameSession) {
    let names = &session.settings().names;
    let (x_lines, o_lines) = session.line_tally().await;
    match session.status().await {
        GameStatus::XWon => println!(
            "Game over! {} (X) wins {} - {}.",
            names.of(Mark::X),
            x_lines,
            o_lines
        ),
        GameStatus::OWon => println!(
            "Game over! {} (O) wins {} - {}.",
            names.of(Mark::O),
            o_lines,
            x_lines
        ),
        GameStatus::Draw => println!("Game over! It's a tie, {} - {}.", x_lines, o_lines),
        GameStatus::InProgress => {}
    }
    print_scores(session);
}

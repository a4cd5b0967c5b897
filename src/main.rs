use std::sync::Arc;

use boardsync::auth::AuthError;
use boardsync::client::ClientError;
use boardsync::config::ConfigError;
use boardsync::mutation::CardChanges;
use boardsync::{BoardClient, ClientConfig, InMemoryNavigator};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("{}", .0.user_message())]
    Client(#[from] ClientError),
    #[error("{}", .0.user_message())]
    Auth(#[from] AuthError),
    #[error("nothing to update; pass --title and/or --description")]
    NothingToUpdate,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "boardsync", about = "Board sync client: session, cards and comments")]
struct Cli {
    /// Overrides BOARDSYNC_BASE_URL from the environment.
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        email: String,
        #[arg(long, env = "BOARDSYNC_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Register {
        name: String,
        email: String,
        #[arg(long, env = "BOARDSYNC_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    Board(BoardCommand),
    Card(CardCommand),
    Comment(CommentCommand),
}

#[derive(Args, Debug)]
struct BoardCommand {
    #[command(subcommand)]
    command: BoardSubcommand,
}

#[derive(Subcommand, Debug)]
enum BoardSubcommand {
    Show { board_id: String },
}

#[derive(Args, Debug)]
struct CardCommand {
    #[command(subcommand)]
    command: CardSubcommand,
}

#[derive(Subcommand, Debug)]
enum CardSubcommand {
    Get {
        card_id: String,
    },
    Create {
        board_id: String,
        list_id: String,
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
    Move {
        board_id: String,
        card_id: String,
        #[arg(long)]
        to: String,
        #[arg(long, default_value_t = 0)]
        index: usize,
    },
    Update {
        board_id: String,
        card_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        board_id: String,
        card_id: String,
    },
}

#[derive(Args, Debug)]
struct CommentCommand {
    #[command(subcommand)]
    command: CommentSubcommand,
}

#[derive(Subcommand, Debug)]
enum CommentSubcommand {
    List { card_id: String },
    Create { card_id: String, content: String },
    Update { card_id: String, comment_id: String, content: String },
    Delete { card_id: String, comment_id: String },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url);
    }

    let navigator = Arc::new(InMemoryNavigator::new("/"));
    let client = BoardClient::from_config(&config, navigator)?;

    match cli.command {
        Command::Login { email, password } => {
            client.auth().login(&email, &password).await?;
            println!("logged in as {email}");
            Ok(())
        }
        Command::Register { name, email, password } => {
            client.auth().register(&name, &email, &password).await?;
            println!("registered {email}");
            Ok(())
        }
        Command::Logout => {
            client.auth().logout().await?;
            println!("logged out");
            Ok(())
        }
        Command::Board(board) => run_board(&client, board).await,
        Command::Card(card) => run_card(&client, card).await,
        Command::Comment(comment) => run_comment(&client, comment).await,
    }
}

async fn run_board(client: &BoardClient, board: BoardCommand) -> Result<(), CliError> {
    match board.command {
        BoardSubcommand::Show { board_id } => {
            let columns = client.load_board(&board_id).await?;
            print_json(&serde_json::to_value(columns)?)
        }
    }
}

async fn run_card(client: &BoardClient, card: CardCommand) -> Result<(), CliError> {
    match card.command {
        CardSubcommand::Get { card_id } => {
            let card = client.get_card(&card_id).await?;
            print_json(&serde_json::to_value(card)?)
        }
        CardSubcommand::Create { board_id, list_id, title, description } => {
            client.load_board(&board_id).await?;
            let json = client.create_card(&list_id, &title, description).await?;
            print_json(&json)
        }
        CardSubcommand::Move { board_id, card_id, to, index } => {
            client.load_board(&board_id).await?;
            let json = client.move_card(&card_id, &to, index).await?;
            print_json(&json)
        }
        CardSubcommand::Update { board_id, card_id, title, description } => {
            let changes = CardChanges { title, description };
            if changes.is_empty() {
                return Err(CliError::NothingToUpdate);
            }
            client.load_board(&board_id).await?;
            let json = client.update_card(&card_id, changes).await?;
            print_json(&json)
        }
        CardSubcommand::Delete { board_id, card_id } => {
            client.load_board(&board_id).await?;
            let json = client.delete_card(&card_id).await?;
            print_json(&json)
        }
    }
}

async fn run_comment(client: &BoardClient, comment: CommentCommand) -> Result<(), CliError> {
    match comment.command {
        CommentSubcommand::List { card_id } => {
            let comments = client.load_comments(&card_id).await?;
            print_json(&serde_json::to_value(comments)?)
        }
        CommentSubcommand::Create { card_id, content } => {
            let json = client.create_comment(&card_id, &content).await?;
            print_json(&json)
        }
        CommentSubcommand::Update { card_id, comment_id, content } => {
            client.load_comments(&card_id).await?;
            let json = client.update_comment(&card_id, &comment_id, &content).await?;
            print_json(&json)
        }
        CommentSubcommand::Delete { card_id, comment_id } => {
            client.load_comments(&card_id).await?;
            let json = client.delete_comment(&card_id, &comment_id).await?;
            print_json(&json)
        }
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

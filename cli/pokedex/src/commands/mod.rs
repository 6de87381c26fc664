use std::io::Write;

use anyhow::{Context, Result};
use bpaf::{Bpaf, ParseFailure, Parser};
use pokedex_catalog::{Client, PokedexClient};
use pokedex_sdk::pokedex::Pokedex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, instrument};

use crate::config::Config;
use crate::utils::message;

mod catalog;
mod collection;

const POKEDEX_DESCRIPTION: &str = "Browse the pokemon catalog and manage your box";
const PROMPT: &str = "pokedex> ";

fn vec_len<T>(x: Vec<T>) -> usize {
    Vec::len(&x)
}

#[derive(Bpaf, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verbosity {
    Verbose(
        /// Increase logging verbosity
        ///
        /// Invoke multiple times for increasing detail.
        #[bpaf(short('v'), long("verbose"), req_flag(()), many, map(vec_len))]
        usize,
    ),

    /// Silence logs except for errors
    #[bpaf(short, long)]
    Quiet,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Verbose(0)
    }
}

#[derive(Bpaf)]
#[bpaf(options, descr(POKEDEX_DESCRIPTION))]
pub struct PokedexCli(#[bpaf(external(pokedex_args))] pub PokedexArgs);

#[derive(Debug, Bpaf)]
#[bpaf(ignore_rustdoc)]
pub struct PokedexArgs {
    /// Verbose mode
    ///
    /// Invoke multiple times for increasing detail.
    #[bpaf(external, fallback(Default::default()))]
    pub verbosity: Verbosity,

    /// Base URL of the pokedex service
    #[bpaf(long("base-url"), argument("URL"))]
    base_url: Option<String>,

    /// Token for your box, overrides the configured one
    #[bpaf(long, argument("TOKEN"))]
    token: Option<String>,

    /// Run a single shell command instead of the interactive shell
    ///
    /// Separate it with `--` if it takes a negative number, as in `-- page -3`.
    #[bpaf(positional("COMMAND"), many)]
    command: Vec<String>,
}

impl PokedexArgs {
    pub async fn handle(self, config: Config) -> Result<()> {
        let client_config = config.client_config(self.base_url, self.token);
        debug!(base_url = %client_config.base_url, "connecting to pokedex service");
        let client = PokedexClient::new(client_config).context("Could not create client")?;
        let mut pokedex = Pokedex::new(Client::Pokedex(client), |alert: &str| {
            message::error(alert)
        });

        // like opening the app, start on the first catalog page
        pokedex.show_page().await;

        if !self.command.is_empty() {
            let words = self.command.iter().map(String::as_str).collect::<Vec<_>>();
            execute(&mut pokedex, &words).await?;
            return Ok(());
        }

        catalog::print_page(&pokedex.catalog);
        run_shell(pokedex).await
    }
}

/// Read commands from stdin until `quit` or end of input.
async fn run_shell(mut pokedex: Pokedex) -> Result<()> {
    message::plain("Type 'help' for a list of commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{PROMPT}");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let words = line.split_whitespace().collect::<Vec<_>>();
        if words.is_empty() {
            continue;
        }

        match execute(&mut pokedex, &words).await {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {},
            Err(err) => message::error(format!("{err:#}")),
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Parse and run one shell command.
///
/// Parse errors and help requests are printed, not returned.
pub async fn execute(pokedex: &mut Pokedex, words: &[&str]) -> Result<Flow> {
    let command = match shell_command().run_inner(words) {
        Ok(command) => command,
        Err(ParseFailure::Stdout(doc, _)) => {
            message::plain(format!("{doc:80}"));
            return Ok(Flow::Continue);
        },
        Err(ParseFailure::Stderr(err)) => {
            message::error(format!("{err:80}"));
            return Ok(Flow::Continue);
        },
        Err(ParseFailure::Completion(comp)) => {
            print!("{comp}");
            return Ok(Flow::Continue);
        },
    };

    command.handle(pokedex).await
}

fn page_number() -> impl Parser<i64> {
    // `any` so that negative pages are not taken for flags
    bpaf::any("PAGE", |page: String| page.parse::<i64>().ok()).help("Page to show, counting from 0")
}

/// Commands of the interactive shell
#[derive(Debug, Clone, PartialEq, Eq, Bpaf)]
#[bpaf(options)]
pub enum ShellCommand {
    /// Reload the current catalog page
    #[bpaf(command("list"), long("ls"))]
    List,

    /// Show the next catalog page
    #[bpaf(command("next"))]
    Next,

    /// Show the previous catalog page
    #[bpaf(command("prev"), long("previous"))]
    Previous,

    /// Jump to a catalog page
    #[bpaf(command("page"))]
    Page {
        #[bpaf(external(page_number))]
        page: i64,
    },

    /// Show the details of a pokemon
    #[bpaf(command("show"))]
    Show {
        /// Name of the pokemon, as listed in the catalog
        #[bpaf(positional("NAME"))]
        name: String,
    },

    /// Close the details
    #[bpaf(command("close"))]
    Close,

    /// Catch a pokemon, by default the one shown in the details
    #[bpaf(command("catch"))]
    Catch {
        /// Name of the pokemon, as listed in the catalog
        #[bpaf(positional("NAME"))]
        name: Option<String>,
    },

    /// Show the pokemon in your box
    #[bpaf(command("box"))]
    Collection,

    /// Edit an entry of your box
    #[bpaf(command("edit"))]
    Edit {
        /// Id of the entry, as shown by 'box'
        #[bpaf(positional("ID"))]
        id: String,
    },

    /// Release an entry from your box
    #[bpaf(command("delete"), long("release"))]
    Delete {
        /// Id of the entry, as shown by 'box'
        #[bpaf(positional("ID"))]
        id: String,
    },

    /// Set the token for your box, or clear it
    #[bpaf(command("token"))]
    Token {
        #[bpaf(positional("TOKEN"))]
        token: Option<String>,
    },

    /// Show this help
    #[bpaf(command("help"))]
    Help,

    /// Leave the pokedex
    #[bpaf(command("quit"), long("exit"))]
    Quit,
}

impl ShellCommand {
    #[instrument(name = "command", skip_all)]
    pub async fn handle(self, pokedex: &mut Pokedex) -> Result<Flow> {
        match self {
            ShellCommand::List => {
                pokedex.show_page().await;
                catalog::print_page(&pokedex.catalog);
            },
            ShellCommand::Next => {
                pokedex.next_page().await;
                catalog::print_page(&pokedex.catalog);
            },
            ShellCommand::Previous => {
                if pokedex.previous_page().await {
                    catalog::print_page(&pokedex.catalog);
                } else {
                    message::warning("Already on the first page");
                }
            },
            ShellCommand::Page { page } => {
                pokedex.go_to_page(page).await;
                catalog::print_page(&pokedex.catalog);
            },
            ShellCommand::Show { name } => {
                pokedex.show_detail(&name).await;
                catalog::print_detail(&pokedex.catalog.detail);
            },
            ShellCommand::Close => {
                pokedex.close_detail();
            },
            ShellCommand::Catch { name } => catalog::catch(pokedex, name.as_deref()).await?,
            ShellCommand::Collection => {
                pokedex.open_collection().await;
                collection::print_collection(&pokedex.collection);
            },
            ShellCommand::Edit { id } => collection::edit(pokedex, &id).await?,
            ShellCommand::Delete { id } => collection::delete(pokedex, &id).await?,
            ShellCommand::Token { token } => {
                let cleared = token.is_none();
                pokedex.client_mut().set_token(token);
                if cleared {
                    message::updated("Token cleared");
                } else {
                    message::updated("Token set");
                }
            },
            ShellCommand::Help => {
                if let Err(ParseFailure::Stdout(doc, _)) = shell_command().run_inner(&["--help"]) {
                    message::plain(format!("{doc:80}"));
                }
            },
            ShellCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use pokedex_catalog::{fixtures, Call, MockClient, Response};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::utils::message::history::History;

    fn parse(words: &[&str]) -> Option<ShellCommand> {
        shell_command().run_inner(words).ok()
    }

    fn mock_pokedex() -> (Pokedex, MockClient) {
        let client = MockClient::new();
        let pokedex = Pokedex::new(Client::Mock(client.clone()), |alert: &str| {
            message::error(alert)
        });
        (pokedex, client)
    }

    #[test]
    fn parses_shell_commands() {
        assert_eq!(parse(&["next"]), Some(ShellCommand::Next));
        assert_eq!(parse(&["previous"]), Some(ShellCommand::Previous));
        assert_eq!(parse(&["show", "pikachu"]), Some(ShellCommand::Show {
            name: "pikachu".to_string()
        }));
        assert_eq!(parse(&["delete", "abc"]), Some(ShellCommand::Delete {
            id: "abc".to_string()
        }));
        assert_eq!(parse(&["token"]), Some(ShellCommand::Token { token: None }));
        assert_eq!(parse(&["exit"]), Some(ShellCommand::Quit));
    }

    #[test]
    fn negative_pages_parse() {
        assert_eq!(parse(&["page", "-3"]), Some(ShellCommand::Page { page: -3 }));
        assert_eq!(parse(&["page", "12"]), Some(ShellCommand::Page { page: 12 }));
        assert_eq!(parse(&["page", "twelve"]), None);
    }

    #[test]
    fn rejects_unknown_commands() {
        assert_eq!(parse(&["fly"]), None);
        assert_eq!(parse(&["show"]), None);
    }

    #[tokio::test]
    async fn negative_page_shows_first_page() {
        let (mut pokedex, client) = mock_pokedex();
        client.push_response(Response::CatalogPage(vec![fixtures::pokemon(1, "bulbasaur")]));

        let flow = execute(&mut pokedex, &["page", "-3"]).await.unwrap();

        assert_eq!(flow, Flow::Continue);
        assert_eq!(client.calls(), vec![Call::ListCatalog {
            limit: 10,
            offset: 0
        }]);
    }

    #[tokio::test]
    async fn prev_on_first_page_warns() {
        let (mut pokedex, client) = mock_pokedex();
        History::global().clear();

        execute(&mut pokedex, &["prev"]).await.unwrap();

        assert!(client.calls().is_empty());
        assert_eq!(&History::global().messages(), &["⚠️  Already on the first page"]);
    }

    #[tokio::test]
    async fn token_is_set_and_cleared() {
        let (mut pokedex, _) = mock_pokedex();
        let token = |pokedex: &Pokedex| match pokedex.client() {
            Client::Mock(client) => client.token().map(ToOwned::to_owned),
            Client::Pokedex(_) => unreachable!(),
        };

        execute(&mut pokedex, &["token", "secret"]).await.unwrap();
        assert_eq!(token(&pokedex).as_deref(), Some("secret"));

        execute(&mut pokedex, &["token"]).await.unwrap();
        assert_eq!(token(&pokedex), None);
    }

    #[tokio::test]
    async fn box_without_token_shows_error() {
        let (mut pokedex, client) = mock_pokedex();
        client.push_error(pokedex_catalog::ClientError::MissingToken);
        History::global().clear();

        execute(&mut pokedex, &["box"]).await.unwrap();

        assert_eq!(pokedex.collection.error(), Some("Missing authentication token"));
        assert_eq!(&History::global().messages(), &[
            "❌ ERROR: Missing authentication token"
        ]);
    }

    #[test]
    fn one_shot_command_after_separator() {
        let args = pokedex_cli()
            .run_inner(&["--token", "secret", "--", "page", "-3"])
            .map(|PokedexCli(args)| args.command)
            .ok();
        assert_eq!(
            args,
            Some(vec!["page".to_string(), "-3".to_string()])
        );
    }

    #[tokio::test]
    async fn delete_loads_the_box_first() {
        let (mut pokedex, client) = mock_pokedex();
        client.push_responses([
            Response::CatalogPage(vec![fixtures::pokemon(25, "pikachu")]),
            Response::CollectionIds(vec!["abc".to_string()]),
            Response::CollectionEntry(fixtures::box_entry("abc", 25)),
            Response::CatalogItem(fixtures::pokemon(25, "pikachu")),
        ]);
        pokedex.show_page().await;
        History::global().clear();

        execute(&mut pokedex, &["delete", "xyz"]).await.unwrap();

        assert_eq!(client.calls()[1..].to_vec(), vec![
            Call::ListCollectionIds,
            Call::GetCollectionEntry("abc".to_string()),
            Call::GetCatalogItem("pikachu".to_string()),
        ]);
        assert_eq!(pokedex.collection.items().len(), 1);
        assert_eq!(&History::global().messages(), &[
            "❌ ERROR: No entry 'xyz' in your box"
        ]);
    }

    #[tokio::test]
    async fn edit_reports_failed_box_load() {
        let (mut pokedex, client) = mock_pokedex();
        client.push_error(pokedex_catalog::ClientError::MissingToken);
        History::global().clear();

        execute(&mut pokedex, &["edit", "abc"]).await.unwrap();

        assert_eq!(client.calls(), vec![Call::ListCollectionIds]);
        assert!(pokedex.collection.editing().is_none());
        assert_eq!(&History::global().messages(), &[
            "❌ ERROR: Missing authentication token"
        ]);
    }

    #[tokio::test]
    async fn catch_by_name_loads_the_details() {
        let (mut pokedex, client) = mock_pokedex();
        client.push_error(pokedex_catalog::ClientError::request(
            pokedex_catalog::StatusCode::NOT_FOUND,
            Some("Pokemon not found".to_string()),
        ));
        History::global().clear();

        execute(&mut pokedex, &["catch", "missingno"]).await.unwrap();

        assert_eq!(client.calls(), vec![Call::GetCatalogItem(
            "missingno".to_string()
        )]);
        assert_eq!(&History::global().messages(), &[
            "❌ ERROR: Pokemon not found"
        ]);
    }

    #[test]
    fn catch_takes_an_optional_name() {
        assert_eq!(parse(&["catch"]), Some(ShellCommand::Catch { name: None }));
        assert_eq!(parse(&["catch", "pikachu"]), Some(ShellCommand::Catch {
            name: Some("pikachu".to_string())
        }));
    }

    #[tokio::test]
    async fn quit_ends_the_shell() {
        let (mut pokedex, _) = mock_pokedex();
        assert_eq!(execute(&mut pokedex, &["quit"]).await.unwrap(), Flow::Quit);
    }

    #[tokio::test]
    async fn parse_errors_do_not_fail() {
        let (mut pokedex, client) = mock_pokedex();
        assert_eq!(
            execute(&mut pokedex, &["fly", "away"]).await.unwrap(),
            Flow::Continue
        );
        assert!(client.calls().is_empty());
    }
}

use orgview_api::RelationshipDto;
use orgview_graph::NodeKey;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Select(String),
    Search(String),
    Suggest(String),
    Toggle(NodeKey),
    ExpandAll,
    CollapseAll,
    Reset,
    Resize(f32),
    Champions,
    Highlight(String),
    Clear,
    Map,
    Stats,
    Connect {
        name: String,
        champion: String,
        relationship: Option<RelationshipDto>,
    },
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  select <name>                 show the hierarchy of a person
  search <query>                search, then show the best match
  suggest <prefix>              fuzzy name suggestions
  toggle <key>                  expand or collapse a card, e.g. toggle 0.1
  expand-all | collapse-all     expand or collapse every card
  reset                         back to the initial view
  resize <width>                change the container width
  champions                     list champions in this hierarchy
  highlight <champion>          mark a champion's connections
  clear                         remove highlights
  map                           list location markers
  stats                         connection summary
  connect <name> | <champion> [| direct|indirect]
  help, quit";

fn require(arg: &str, what: &str) -> Result<String, String> {
    if arg.is_empty() {
        Err(format!("Missing {what}"))
    } else {
        Ok(arg.to_string())
    }
}

fn parse_relationship(raw: &str) -> Result<RelationshipDto, String> {
    match raw.to_ascii_lowercase().as_str() {
        "direct" => Ok(RelationshipDto::Direct),
        "indirect" => Ok(RelationshipDto::Indirect),
        "none" => Ok(RelationshipDto::None),
        other => Err(format!("Unknown relationship: {other}")),
    }
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, String> {
        let line = line.trim();
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        match verb.to_ascii_lowercase().as_str() {
            "select" => Ok(Command::Select(require(rest, "name")?)),
            "search" | "find" => Ok(Command::Search(require(rest, "query")?)),
            "suggest" => Ok(Command::Suggest(require(rest, "prefix")?)),
            "toggle" | "t" => rest
                .parse::<NodeKey>()
                .map(Command::Toggle)
                .map_err(|e| e.to_string()),
            "expand-all" => Ok(Command::ExpandAll),
            "collapse-all" => Ok(Command::CollapseAll),
            "reset" => Ok(Command::Reset),
            "resize" => rest
                .parse::<f32>()
                .ok()
                .filter(|w| *w > 0.0)
                .map(Command::Resize)
                .ok_or_else(|| format!("Invalid width: {rest:?}")),
            "champions" => Ok(Command::Champions),
            "highlight" => Ok(Command::Highlight(require(rest, "champion")?)),
            "clear" => Ok(Command::Clear),
            "map" => Ok(Command::Map),
            "stats" => Ok(Command::Stats),
            "connect" => {
                let mut parts = rest.split('|').map(str::trim);
                let name = require(parts.next().unwrap_or_default(), "name")?;
                let champion = require(parts.next().unwrap_or_default(), "champion")?;
                let relationship = parts.next().map(parse_relationship).transpose()?;
                Ok(Command::Connect {
                    name,
                    champion,
                    relationship,
                })
            }
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            "" => Err("Empty command".to_string()),
            other => Err(format!("Unknown command: {other}")),
        }
    }
}

//! Line commands of the terminal front end.

use crate::editor::EditorEvent;
use crate::models::{CatalogScope, DocumentHeader, ItemId};
use crate::render::{RowAction, RowEvent};
use crate::store::{DropTarget, Placement};

pub const HELP: &str = "\
commands:
  search <products|bundles> <text>   type into a search box
  more <scope>                       load the next page of suggestions
  pick <scope> <index> [qty]         add a suggestion (1-based index)
  qty|cost|retail <id> <value>       edit a row
  rm <id>                            remove a row (bundles take their components)
  toggle <id>                        collapse or expand a bundle
  move <id> <before|after> <id>      reorder rows
  refresh                            refresh cost and stock from the catalog
  save <customer-id> <status> <name...>
  show | html | help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Event(EditorEvent),
    Show,
    Html,
    Help,
    Quit,
}

fn item_id(raw: Option<&str>) -> Result<ItemId, String> {
    let raw = raw.ok_or("missing item id")?;
    raw.parse()
        .map(ItemId)
        .map_err(|_| format!("'{}' is not an item id", raw))
}

fn scope(raw: Option<&str>) -> Result<CatalogScope, String> {
    raw.ok_or_else(|| "missing scope".to_string())?.parse()
}

fn row(item: ItemId, action: RowAction) -> Command {
    Command::Event(EditorEvent::Row(RowEvent { item, action }))
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(Command::Show);
    };

    let command = match verb {
        "search" | "s" => {
            let scope = scope(words.next())?;
            let text = words.collect::<Vec<_>>().join(" ");
            Command::Event(EditorEvent::SearchInput { scope, text })
        }
        "more" => Command::Event(EditorEvent::LoadMore(scope(words.next())?)),
        "pick" => {
            let scope = scope(words.next())?;
            let index: usize = words
                .next()
                .ok_or("missing suggestion index")?
                .parse()
                .map_err(|_| "suggestion index must be a number".to_string())?;
            if index == 0 {
                return Err("suggestion indexes start at 1".to_string());
            }
            Command::Event(EditorEvent::Select {
                scope,
                index: index - 1,
                quantity: words.next().unwrap_or_default().to_string(),
            })
        }
        "qty" | "cost" | "retail" => {
            let id = item_id(words.next())?;
            let value = words.next().unwrap_or_default().to_string();
            let action = match verb {
                "qty" => RowAction::EditQuantity(value),
                "cost" => RowAction::EditUnitCost(value),
                _ => RowAction::EditUnitRetail(value),
            };
            row(id, action)
        }
        "rm" => row(item_id(words.next())?, RowAction::Remove),
        "toggle" => row(item_id(words.next())?, RowAction::ToggleChildren),
        "move" => {
            let id = item_id(words.next())?;
            let placement = match words.next() {
                Some("before") => Placement::Before,
                Some("after") => Placement::After,
                _ => return Err("expected 'before' or 'after'".to_string()),
            };
            let anchor = item_id(words.next())?;
            Command::Event(EditorEvent::Move {
                id,
                target: DropTarget { anchor, placement },
            })
        }
        "refresh" => Command::Event(EditorEvent::RefreshPricing),
        "save" => {
            let customer_id = words.next().ok_or("missing customer id")?;
            let status = words.next().ok_or("missing status")?;
            let customer_name = words.collect::<Vec<_>>().join(" ");
            Command::Event(EditorEvent::Save(DocumentHeader {
                customer_id: (customer_id != "-").then(|| customer_id.to_string()),
                customer_name,
                customer_address: String::new(),
                status: status.to_string(),
            }))
        }
        "show" => Command::Show,
        "html" => Command::Html,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command '{}'", other)),
    };
    Ok(command)
}

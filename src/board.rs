// File: ./src/board.rs
//! Board lookup and name resolution.
//!
//! The board is fetched once per run; lists, labels and members are turned into
//! read-only maps that the submitter consults for every card.
use crate::client::{BoardApi, BoardLabel, BoardList, BoardMember};
use crate::error::RunError;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

fn board_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"trello\.com/(?:b|board)/([A-Za-z0-9]+)").expect("valid board url regex")
    })
}

fn is_short_link(value: &str) -> bool {
    value.len() == 8 && value.chars().all(|c| c.is_ascii_alphanumeric())
}

fn is_board_id(value: &str) -> bool {
    value.len() == 24 && value.chars().all(|c| c.is_ascii_hexdigit())
}

/// Extracts the short link (or id) from a board URL.
///
/// Accepts `https://trello.com/b/<shortLink>/<slug>`, the `/board/` variant,
/// scheme-less URLs, and a bare short link or 24-digit hex id.
pub fn extract_board_ref(input: &str) -> Result<String, RunError> {
    let trimmed = input.trim();
    if let Some(caps) = board_url_regex().captures(trimmed) {
        return Ok(caps[1].to_string());
    }
    if is_short_link(trimmed) || is_board_id(trimmed) {
        return Ok(trimmed.to_string());
    }
    Err(RunError::InvalidBoardUrl(trimmed.to_string()))
}

/// A name from the document that could not be matched on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionWarning {
    /// The list was not found and the card went to the default list.
    ListFallback { requested: String, fallback: String },
    UnknownLabel(String),
    UnknownMember(String),
}

impl fmt::Display for ResolutionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionWarning::ListFallback {
                requested,
                fallback,
            } => write!(
                f,
                "list '{}' not found on the board; card placed in '{}'",
                requested, fallback
            ),
            ResolutionWarning::UnknownLabel(name) => {
                write!(f, "label '{}' not found on the board; skipped", name)
            }
            ResolutionWarning::UnknownMember(name) => {
                write!(f, "member '{}' is not on the board; skipped", name)
            }
        }
    }
}

/// A named board entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Named {
    pub id: String,
    pub name: String,
}

impl Named {
    fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

/// Exact match first, then ASCII case-insensitive. First entry wins on ties.
fn find_by_name<'a>(entries: &'a [Named], name: &str) -> Option<&'a Named> {
    let name = name.trim();
    entries
        .iter()
        .find(|e| e.name == name)
        .or_else(|| entries.iter().find(|e| e.name.eq_ignore_ascii_case(name)))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardContext {
    pub board_id: String,
    pub board_name: String,
    /// Open lists in board order.
    pub lists: Vec<Named>,
    pub labels: Vec<Named>,
    /// Members keyed by username.
    pub members: Vec<Named>,
    pub default_list: Option<Named>,
}

impl BoardContext {
    /// Fetches the board and its lists, labels and members.
    ///
    /// The board fetch doubles as the credential check: a 401/403 here becomes
    /// [`RunError::Unauthorized`].
    pub async fn build(
        api: &dyn BoardApi,
        board_ref: &str,
        default_list: Option<&str>,
    ) -> Result<Self, RunError> {
        let board = api
            .get_board(board_ref)
            .await
            .map_err(RunError::from_board_error)?;
        log::info!("Connected to board '{}' ({})", board.name, board.id);
        if board.closed {
            log::warn!("Board '{}' is closed", board.name);
        }

        let lists = api
            .get_lists(&board.id)
            .await
            .map_err(RunError::from_board_error)?;
        let labels = api
            .get_labels(&board.id)
            .await
            .map_err(RunError::from_board_error)?;
        let members = api
            .get_members(&board.id)
            .await
            .map_err(RunError::from_board_error)?;

        let ctx = Self::from_parts(
            board.id,
            board.name,
            &lists,
            &labels,
            &members,
            default_list,
        );
        log::debug!(
            "Board context: {} lists, {} labels, {} members",
            ctx.lists.len(),
            ctx.labels.len(),
            ctx.members.len()
        );
        Ok(ctx)
    }

    /// Builds the context from already fetched entities.
    ///
    /// The default list is the configured name when it resolves, otherwise the
    /// first open list. A configured name that does not resolve leaves no
    /// default, so cards without a valid `List:` fail instead of landing
    /// somewhere unexpected.
    pub fn from_parts(
        board_id: String,
        board_name: String,
        lists: &[BoardList],
        labels: &[BoardLabel],
        members: &[BoardMember],
        default_list: Option<&str>,
    ) -> Self {
        let lists: Vec<Named> = lists
            .iter()
            .filter(|l| !l.closed)
            .map(|l| Named::new(&l.id, &l.name))
            .collect();
        let labels = labels
            .iter()
            .filter(|l| !l.name.is_empty())
            .map(|l| Named::new(&l.id, &l.name))
            .collect();
        let members = members
            .iter()
            .map(|m| Named::new(&m.id, &m.username))
            .collect();

        let default_list = match default_list.map(str::trim).filter(|s| !s.is_empty()) {
            Some(name) => {
                let found = find_by_name(&lists, name).cloned();
                if found.is_none() {
                    log::warn!("Configured default list '{}' is not on the board", name);
                }
                found
            }
            None => lists.first().cloned(),
        };

        Self {
            board_id,
            board_name,
            lists,
            labels,
            members,
            default_list,
        }
    }

    pub fn find_list(&self, name: &str) -> Option<&Named> {
        find_by_name(&self.lists, name)
    }

    pub fn find_label(&self, name: &str) -> Option<&Named> {
        find_by_name(&self.labels, name)
    }

    pub fn find_member(&self, username: &str) -> Option<&Named> {
        let username = username.trim().trim_start_matches('@');
        self.members
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(username))
    }

    /// Target list for a card. `Ok` carries the id and an optional fallback warning.
    pub fn resolve_list(
        &self,
        requested: Option<&str>,
    ) -> Result<(String, Option<ResolutionWarning>), String> {
        if let Some(name) = requested
            && let Some(list) = self.find_list(name)
        {
            return Ok((list.id.clone(), None));
        }
        let Some(fallback) = &self.default_list else {
            return Err(match requested {
                Some(name) => format!("list '{}' not found and no default list is available", name),
                None => "no list given and no default list is available".to_string(),
            });
        };
        let warning = requested.map(|name| ResolutionWarning::ListFallback {
            requested: name.to_string(),
            fallback: fallback.name.clone(),
        });
        Ok((fallback.id.clone(), warning))
    }

    /// Label ids in document order; unknown names become warnings.
    pub fn resolve_labels(&self, names: &[String]) -> (Vec<String>, Vec<ResolutionWarning>) {
        resolve_many(names, |n| self.find_label(n), ResolutionWarning::UnknownLabel)
    }

    pub fn resolve_members(&self, names: &[String]) -> (Vec<String>, Vec<ResolutionWarning>) {
        resolve_many(names, |n| self.find_member(n), ResolutionWarning::UnknownMember)
    }
}

fn resolve_many<'a, F, W>(names: &[String], find: F, warn: W) -> (Vec<String>, Vec<ResolutionWarning>)
where
    F: Fn(&str) -> Option<&'a Named>,
    W: Fn(String) -> ResolutionWarning,
{
    let mut ids: Vec<String> = Vec::new();
    let mut warnings = Vec::new();
    for name in names {
        match find(name) {
            Some(entry) => {
                if !ids.contains(&entry.id) {
                    ids.push(entry.id.clone());
                }
            }
            None => warnings.push(warn(name.clone())),
        }
    }
    (ids, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_urls_and_bare_references() {
        assert_eq!(
            extract_board_ref("https://trello.com/b/AbCd1234/my-board").unwrap(),
            "AbCd1234"
        );
        assert_eq!(
            extract_board_ref("trello.com/board/AbCd1234").unwrap(),
            "AbCd1234"
        );
        assert_eq!(extract_board_ref(" AbCd1234 ").unwrap(), "AbCd1234");
        assert_eq!(
            extract_board_ref("5f1e2d3c4b5a69788796a5b4").unwrap(),
            "5f1e2d3c4b5a69788796a5b4"
        );
        assert!(extract_board_ref("https://example.com/b/AbCd1234").is_err());
        assert!(extract_board_ref("not a board").is_err());
    }
}

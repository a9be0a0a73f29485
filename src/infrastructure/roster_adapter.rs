use std::{fs, path::Path};

use anyhow::{bail, Context, Result};

use crate::domain::entities::RosterEntry;

const LOGIN_COLUMN: &str = "github_login";
const SLACK_ID_COLUMN: &str = "slack_id";

/// Loads the static user roster from a comma-separated file with a header
/// row. Extra columns are ignored; malformed rows are skipped with a warning
/// so one bad line does not take the bridge down at startup.
pub fn load_roster(path: &Path) -> Result<Vec<RosterEntry>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read roster {}", path.display()))?;
    parse_roster(&raw).with_context(|| format!("invalid roster {}", path.display()))
}

fn parse_roster(raw: &str) -> Result<Vec<RosterEntry>> {
    let mut lines = raw.lines().enumerate();
    let header = loop {
        match lines.next() {
            Some((_, line)) if line.trim().is_empty() => continue,
            Some((_, line)) => break line,
            None => bail!("roster is empty"),
        }
    };

    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    let login_idx = column_index(&columns, LOGIN_COLUMN)?;
    let slack_idx = column_index(&columns, SLACK_ID_COLUMN)?;

    let mut entries = Vec::new();
    for (number, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let (login, slack_id) = match (fields.get(login_idx), fields.get(slack_idx)) {
            (Some(login), Some(slack_id)) if !login.is_empty() && !slack_id.is_empty() => {
                (*login, *slack_id)
            }
            _ => {
                tracing::warn!(line = number + 1, "skipping malformed roster row");
                continue;
            }
        };
        entries.push(RosterEntry {
            github_login: login.to_string(),
            slack_id: slack_id.to_string(),
        });
    }

    Ok(entries)
}

fn column_index(columns: &[&str], name: &str) -> Result<usize> {
    columns
        .iter()
        .position(|c| *c == name)
        .with_context(|| format!("roster header is missing the {name} column"))
}

#[cfg(test)]
mod tests {
    use super::parse_roster;

    #[test]
    fn parses_rows_in_file_order() {
        let raw = "name,github_login,slack_id\n\
                   Ada,ada-l,U100\n\
                   Grace,ghopper,U200\n";
        let roster = parse_roster(raw).expect("roster");
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].github_login, "ada-l");
        assert_eq!(roster[0].slack_id, "U100");
        assert_eq!(roster[1].github_login, "ghopper");
    }

    #[test]
    fn duplicate_logins_are_kept_so_first_match_wins() {
        let raw = "github_login,slack_id\nada-l,U100\nada-l,U999\n";
        let roster = parse_roster(raw).expect("roster");
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].slack_id, "U100");
    }

    #[test]
    fn skips_malformed_rows() {
        let raw = "github_login,slack_id\nada-l,U100\nonly-one-field\n,U300\n";
        let roster = parse_roster(raw).expect("roster");
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn rejects_missing_columns_and_empty_input() {
        assert!(parse_roster("login,slack\nada,U1\n").is_err());
        assert!(parse_roster("").is_err());
    }
}

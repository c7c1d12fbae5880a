//! Command grammar: prefix detection, argument splitting and type coercion.
//!
//! Arguments are split on whitespace; double quotes group several words into
//! one argument so multi-word skill names can be passed:
//! `!add_skill "jewelry crafting" 40`.

use thiserror::Error;

/// A parsed command invocation with its arguments already coerced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Register {
        character_name: String,
        /// Left optional so the handler can answer with its own usage hint.
        skill_level: Option<i64>,
    },
    AddRecipe {
        name: String,
        required_skill: i64,
    },
    Recipe {
        name: String,
    },
    AddSkill {
        skill_name: String,
        level: i64,
    },
    AddStat {
        stat_name: String,
        value: i64,
    },
    View {
        /// `None` targets the invoking member.
        target: Option<i64>,
    },
    DeleteProfile,
    DeleteAllProfiles,
    Help,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Register { .. } => "register",
            Command::AddRecipe { .. } => "add_recipe",
            Command::Recipe { .. } => "recipe",
            Command::AddSkill { .. } => "add_skill",
            Command::AddStat { .. } => "add_stat",
            Command::View { .. } => "view",
            Command::DeleteProfile => "delete_profile",
            Command::DeleteAllProfiles => "delete_all_profiles",
            Command::Help => "help",
        }
    }
}

/// Command names paired with their argument synopsis, in help order.
pub const COMMANDS: &[(&str, &str)] = &[
    ("register", "<char_name> <skill_level>"),
    ("add_recipe", "<recipe_name> <required_skill>"),
    ("recipe", "<recipe_name>"),
    ("add_skill", "<skill_name> <level>"),
    ("add_stat", "<stat_name> <value>"),
    ("view", "[@member]"),
    ("delete_profile", ""),
    ("delete_all_profiles", ""),
    ("help", ""),
];

/// `` `!register <char_name> <skill_level>` ``
pub fn usage(prefix: &str, command: &str) -> String {
    let synopsis = COMMANDS
        .iter()
        .find(|(name, _)| *name == command)
        .map(|(_, s)| *s)
        .unwrap_or_default();
    if synopsis.is_empty() {
        format!("`{prefix}{command}`")
    } else {
        format!("`{prefix}{command} {synopsis}`")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("Missing argument `{argument}`. Usage: {usage}")]
    MissingArgument { argument: &'static str, usage: String },
    #[error("`{argument}` must be a whole number, got '{value}'. Usage: {usage}")]
    NotAnInteger {
        argument: &'static str,
        value: String,
        usage: String,
    },
    #[error("'{value}' is not a member reference. Usage: {usage}")]
    NotAMember { value: String, usage: String },
    #[error("Unterminated quote. Usage: {usage}")]
    UnterminatedQuote { usage: String },
}

/// Parse `text` as a command.
///
/// Returns `None` when the text does not start with `prefix` or names an
/// unknown command; those messages are not meant for the bot.
pub fn parse(prefix: &str, text: &str) -> Option<Result<Command, UsageError>> {
    let body = text.trim().strip_prefix(prefix)?;
    let (name, rest) = match body.find(char::is_whitespace) {
        Some(idx) => (&body[..idx], &body[idx..]),
        None => (body, ""),
    };
    let name = name.to_lowercase();
    if !COMMANDS.iter().any(|(n, _)| *n == name) {
        return None;
    }
    let usage = usage(prefix, &name);
    Some(split_args(rest, &usage).and_then(|args| build(&name, args, usage)))
}

fn build(name: &str, args: Vec<String>, usage: String) -> Result<Command, UsageError> {
    let mut args = Args { inner: args.into_iter(), usage };
    let command = match name {
        "register" => Command::Register {
            character_name: args.string("char_name")?,
            skill_level: args.optional_integer("skill_level")?,
        },
        "add_recipe" => Command::AddRecipe {
            name: args.string("recipe_name")?,
            required_skill: args.integer("required_skill")?,
        },
        "recipe" => Command::Recipe {
            name: args.string("recipe_name")?,
        },
        "add_skill" => Command::AddSkill {
            skill_name: args.string("skill_name")?,
            level: args.integer("level")?,
        },
        "add_stat" => Command::AddStat {
            stat_name: args.string("stat_name")?,
            value: args.integer("value")?,
        },
        "view" => Command::View {
            target: args.optional_member()?,
        },
        "delete_profile" => Command::DeleteProfile,
        "delete_all_profiles" => Command::DeleteAllProfiles,
        _ => Command::Help,
    };
    Ok(command)
}

struct Args {
    inner: std::vec::IntoIter<String>,
    usage: String,
}

impl Args {
    fn string(&mut self, argument: &'static str) -> Result<String, UsageError> {
        // `""` counts as missing
        match self.inner.next() {
            Some(raw) if !raw.is_empty() => Ok(raw),
            _ => Err(UsageError::MissingArgument {
                argument,
                usage: self.usage.clone(),
            }),
        }
    }

    fn integer(&mut self, argument: &'static str) -> Result<i64, UsageError> {
        let raw = self.string(argument)?;
        self.coerce(argument, raw)
    }

    fn optional_integer(&mut self, argument: &'static str) -> Result<Option<i64>, UsageError> {
        match self.inner.next() {
            Some(raw) => self.coerce(argument, raw).map(Some),
            None => Ok(None),
        }
    }

    fn optional_member(&mut self) -> Result<Option<i64>, UsageError> {
        match self.inner.next() {
            Some(raw) => parse_member_ref(&raw).map(Some).ok_or(UsageError::NotAMember {
                value: raw,
                usage: self.usage.clone(),
            }),
            None => Ok(None),
        }
    }

    fn coerce(&self, argument: &'static str, raw: String) -> Result<i64, UsageError> {
        raw.parse().map_err(|_| UsageError::NotAnInteger {
            argument,
            value: raw,
            usage: self.usage.clone(),
        })
    }
}

/// Accepts `<@123>`, `<@!123>` or a bare `123`.
pub fn parse_member_ref(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let id = raw
        .strip_prefix("<@")
        .and_then(|s| s.strip_suffix('>'))
        .map(|s| s.strip_prefix('!').unwrap_or(s))
        .unwrap_or(raw);
    id.parse().ok()
}

fn split_args(input: &str, usage: &str) -> Result<Vec<String>, UsageError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for ch in input.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        return Err(UsageError::UnterminatedQuote { usage: usage.to_string() });
    }
    if has_token {
        args.push(current);
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(text: &str) -> Command {
        parse("!", text).expect("should be a command").expect("should parse")
    }

    #[test]
    fn test_non_commands_are_ignored() {
        assert!(parse("!", "hello there").is_none());
        assert!(parse("!", "confirm").is_none());
        assert!(parse("!", "!dance").is_none());
        assert!(parse("!", "").is_none());
    }

    #[test]
    fn test_register_with_and_without_level() {
        assert_eq!(
            ok("!register Thorin 5"),
            Command::Register { character_name: "Thorin".into(), skill_level: Some(5) }
        );
        assert_eq!(
            ok("!register Thorin"),
            Command::Register { character_name: "Thorin".into(), skill_level: None }
        );
    }

    #[test]
    fn test_quoted_skill_name() {
        assert_eq!(
            ok(r#"!add_skill "Jewelry Crafting" 40"#),
            Command::AddSkill { skill_name: "Jewelry Crafting".into(), level: 40 }
        );
    }

    #[test]
    fn test_command_name_is_case_insensitive() {
        assert_eq!(ok("!Recipe sword"), Command::Recipe { name: "sword".into() });
    }

    #[test]
    fn test_view_member_references() {
        assert_eq!(ok("!view"), Command::View { target: None });
        assert_eq!(ok("!view <@42>"), Command::View { target: Some(42) });
        assert_eq!(ok("!view <@!42>"), Command::View { target: Some(42) });
        assert_eq!(ok("!view 42"), Command::View { target: Some(42) });
        assert!(matches!(
            parse("!", "!view bob"),
            Some(Err(UsageError::NotAMember { .. }))
        ));
    }

    #[test]
    fn test_usage_errors() {
        match parse("!", "!add_recipe sword ten") {
            Some(Err(UsageError::NotAnInteger { argument, value, usage })) => {
                assert_eq!(argument, "required_skill");
                assert_eq!(value, "ten");
                assert_eq!(usage, "`!add_recipe <recipe_name> <required_skill>`");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(
            parse("!", "!add_stat strength"),
            Some(Err(UsageError::MissingArgument { argument: "value", .. }))
        ));
        assert!(matches!(
            parse("!", r#"!recipe "iron sword"#),
            Some(Err(UsageError::UnterminatedQuote { .. }))
        ));
    }

    #[test]
    fn test_empty_quoted_argument_is_missing() {
        assert!(matches!(
            parse("!", r#"!register "" 5"#),
            Some(Err(UsageError::MissingArgument { argument: "char_name", .. }))
        ));
        assert!(matches!(
            parse("!", r#"!recipe """#),
            Some(Err(UsageError::MissingArgument { argument: "recipe_name", .. }))
        ));
        assert!(matches!(
            parse("!", r#"!add_stat strength """#),
            Some(Err(UsageError::MissingArgument { argument: "value", .. }))
        ));
    }

    #[test]
    fn test_custom_prefix_and_usage() {
        assert_eq!(
            parse("?", "?delete_profile").unwrap().unwrap(),
            Command::DeleteProfile
        );
        assert!(parse("?", "!delete_profile").is_none());
        assert_eq!(usage("?", "delete_all_profiles"), "`?delete_all_profiles`");
    }
}

//! Keyboard mapping and scripted pointer input.

use crate::error::{Result, WidgetError};
use crate::types::Point;

use super::composer::{PointerOutcome, SceneComposer};

/// An edit applied to the selected layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    RotateLeft,
    RotateRight,
    ScaleUp,
    ScaleDown,
    ResetTransform,
    /// Removes a sticker; resets a fixed layer to its default transform.
    Delete,
}

impl EditAction {
    /// Maps a DOM-style key name to an action.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "q" | "Q" => Some(EditAction::RotateLeft),
            "e" | "E" => Some(EditAction::RotateRight),
            "+" | "=" => Some(EditAction::ScaleUp),
            "-" | "_" => Some(EditAction::ScaleDown),
            "r" | "R" => Some(EditAction::ResetTransform),
            "Delete" | "Backspace" => Some(EditAction::Delete),
            _ => None,
        }
    }
}

/// One line of an interaction script.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptStep {
    Down(Point),
    Move(Point),
    Up(Point),
    /// Down and up at the same point.
    Click(Point),
    Key(String),
}

/// Parses a script of `down x,y`, `move x,y`, `up x,y`, `click x,y` and
/// `key K` lines. Blank lines and `#` comments are skipped.
pub fn parse_script(source: &str) -> Result<Vec<ScriptStep>> {
    let mut steps = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let point = || {
            rest.parse::<Point>()
                .map_err(|e| WidgetError::config(format!("script line {}: {e}", index + 1)))
        };
        let step = match verb.to_ascii_lowercase().as_str() {
            "down" => ScriptStep::Down(point()?),
            "move" => ScriptStep::Move(point()?),
            "up" => ScriptStep::Up(point()?),
            "click" => ScriptStep::Click(point()?),
            "key" if !rest.is_empty() => ScriptStep::Key(rest.to_string()),
            "key" => {
                return Err(WidgetError::config(format!(
                    "script line {}: key needs a key name",
                    index + 1
                )))
            }
            other => {
                return Err(WidgetError::config(format!(
                    "script line {}: unknown step '{other}'",
                    index + 1
                )))
            }
        };
        steps.push(step);
    }
    Ok(steps)
}

impl ScriptStep {
    /// Feeds this step to a composer. Returns the gesture outcome for `up` and `click`.
    pub fn apply(&self, composer: &mut SceneComposer) -> Option<PointerOutcome> {
        match self {
            ScriptStep::Down(p) => {
                composer.pointer_down(*p);
                None
            }
            ScriptStep::Move(p) => {
                composer.pointer_move(*p);
                None
            }
            ScriptStep::Up(p) => Some(composer.pointer_up(*p)),
            ScriptStep::Click(p) => {
                composer.pointer_down(*p);
                Some(composer.pointer_up(*p))
            }
            ScriptStep::Key(key) => {
                composer.apply_key(key);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_actions() {
        assert_eq!(EditAction::from_key("Q"), Some(EditAction::RotateLeft));
        assert_eq!(EditAction::from_key("="), Some(EditAction::ScaleUp));
        assert_eq!(EditAction::from_key("_"), Some(EditAction::ScaleDown));
        assert_eq!(EditAction::from_key("Backspace"), Some(EditAction::Delete));
        assert_eq!(EditAction::from_key("x"), None);
        assert_eq!(EditAction::from_key("delete"), None);
    }

    #[test]
    fn parses_all_step_kinds() {
        let steps = parse_script(
            "# drag the logo\ndown 10,20\nmove 60, 20\nup 60,20\n\nclick 5,5\nkey +\nKEY Delete\n",
        )
        .unwrap();
        assert_eq!(
            steps,
            vec![
                ScriptStep::Down(Point::new(10.0, 20.0)),
                ScriptStep::Move(Point::new(60.0, 20.0)),
                ScriptStep::Up(Point::new(60.0, 20.0)),
                ScriptStep::Click(Point::new(5.0, 5.0)),
                ScriptStep::Key("+".into()),
                ScriptStep::Key("Delete".into()),
            ]
        );
    }

    #[test]
    fn reports_line_numbers() {
        let err = parse_script("down 1,1\nfling 2,2").unwrap_err();
        assert!(err.to_string().contains("script line 2"), "{err}");
        assert!(parse_script("down 1").is_err());
        assert!(parse_script("key").is_err());
    }
}

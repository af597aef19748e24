//! Evaluation tasks
//!
//! A task fixes the granularity at which two classifications are compared. Each task
//! coarsens categories through its own table, mapping every category onto the
//! representative of its coarse class (ANY for everything the task ignores). Tables
//! are idempotent: adapting an adapted category changes nothing.
//!
//! Tasks are identified on the wire by the integer codes learned models are trained
//! and logged with.

use super::hcode::HCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("unknown task code {0}, expected one of 28, 37, 55, 66")]
    UnknownTaskCode(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum TaskCode {
    /// Lexical categories only.
    Lexical,
    /// Lexical plus class, function and variable declarators.
    Declarators,
    /// Declarators plus type and function identifiers.
    Identifiers,
    /// Every category.
    Full,
}

impl TaskCode {
    pub const ALL: [TaskCode; 4] = [
        TaskCode::Lexical,
        TaskCode::Declarators,
        TaskCode::Identifiers,
        TaskCode::Full,
    ];

    pub fn code(self) -> u32 {
        match self {
            TaskCode::Lexical => 28,
            TaskCode::Declarators => 37,
            TaskCode::Identifiers => 55,
            TaskCode::Full => 66,
        }
    }

    pub fn from_code(code: u32) -> Result<Self, TaskError> {
        Self::ALL
            .into_iter()
            .find(|task| task.code() == code)
            .ok_or(TaskError::UnknownTaskCode(code))
    }

    pub fn adapt(self, hcode: HCode) -> HCode {
        use HCode::*;
        let kept = match self {
            TaskCode::Full => return hcode,
            TaskCode::Lexical => matches!(hcode, Any | Keyword | Literal | CharStringLiteral | Comment),
            TaskCode::Declarators => {
                TaskCode::Lexical.adapt(hcode) != Any
                    || matches!(hcode, ClassDeclarator | FunctionDeclarator | VariableDeclarator)
            }
            TaskCode::Identifiers => {
                TaskCode::Declarators.adapt(hcode) != Any
                    || matches!(hcode, TypeIdentifier | FunctionIdentifier)
            }
        };
        if kept {
            hcode
        } else {
            Any
        }
    }

    /// Categories a task can produce.
    pub fn categories(self) -> Vec<HCode> {
        HCode::ALL
            .into_iter()
            .filter(|hcode| self.adapt(*hcode) == *hcode)
            .collect()
    }
}

impl fmt::Display for TaskCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl TryFrom<u32> for TaskCode {
    type Error = TaskError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

impl From<TaskCode> for u32 {
    fn from(task: TaskCode) -> Self {
        task.code()
    }
}

impl FromStr for TaskCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lexical" => Ok(TaskCode::Lexical),
            "declarators" => Ok(TaskCode::Declarators),
            "identifiers" => Ok(TaskCode::Identifiers),
            "full" => Ok(TaskCode::Full),
            other => other
                .parse::<u32>()
                .map_err(|_| format!("invalid task '{}'", other))
                .and_then(|code| Self::from_code(code).map_err(|e| e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for task in TaskCode::ALL {
            assert_eq!(TaskCode::from_code(task.code()), Ok(task));
            assert_eq!(task.to_string().parse::<TaskCode>(), Ok(task));
        }
        assert_eq!(TaskCode::from_code(42), Err(TaskError::UnknownTaskCode(42)));
        assert!("coarse".parse::<TaskCode>().is_err());
    }

    #[test]
    fn test_tables_nest() {
        assert_eq!(TaskCode::Lexical.categories().len(), 5);
        assert_eq!(TaskCode::Declarators.categories().len(), 8);
        assert_eq!(TaskCode::Identifiers.categories().len(), 10);
        assert_eq!(TaskCode::Full.categories().len(), HCode::ALL.len());
    }

    #[test]
    fn test_ignored_categories_become_any() {
        assert_eq!(TaskCode::Lexical.adapt(HCode::ClassDeclarator), HCode::Any);
        assert_eq!(TaskCode::Declarators.adapt(HCode::FieldIdentifier), HCode::Any);
        assert_eq!(
            TaskCode::Identifiers.adapt(HCode::FunctionIdentifier),
            HCode::FunctionIdentifier
        );
        assert_eq!(TaskCode::Identifiers.adapt(HCode::AnnotationDeclarator), HCode::Any);
    }

    #[test]
    fn test_serde_uses_codes() {
        assert_eq!(serde_json::to_string(&TaskCode::Identifiers).unwrap(), "55");
        assert_eq!(serde_json::from_str::<TaskCode>("37").unwrap(), TaskCode::Declarators);
        assert!(serde_json::from_str::<TaskCode>("30").is_err());
    }
}

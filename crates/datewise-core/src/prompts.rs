//! Task profiles and the system prompts each method needs.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{DatewiseError, Result};
use crate::tools::ToolBackend;

/// Evaluation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Single-shot chain-of-thought.
    Cot,
    React,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cot => "cot",
            Self::React => "react",
        })
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cot" => Ok(Self::Cot),
            "react" => Ok(Self::React),
            other => Err(format!("unknown method '{other}' (expected cot|react)")),
        }
    }
}

/// Which ReAct loop a task uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactVariant {
    /// One decision, at most one tool, one final answer.
    SingleStep,
    /// Bounded think/act/observe loop.
    MultiTurn,
}

/// Dataset task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    #[default]
    T1,
    T3,
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::T1 => "t1",
            Self::T3 => "t3",
        })
    }
}

impl FromStr for Task {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "t1" => Ok(Self::T1),
            "t3" => Ok(Self::T3),
            other => Err(format!("unknown task '{other}' (expected t1|t3)")),
        }
    }
}

/// Everything that differs between tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskProfile {
    pub task: Task,
    pub dataset_file: &'static str,
    pub variant: ReactVariant,
    pub backend: ToolBackend,
    /// Appended to `<task>_<method>_results` in the output file name.
    pub output_suffix: &'static str,
}

impl TaskProfile {
    pub fn for_task(task: Task) -> Self {
        match task {
            Task::T1 => Self {
                task,
                dataset_file: "T1_dataset.json",
                variant: ReactVariant::SingleStep,
                backend: ToolBackend::Live,
                output_suffix: "",
            },
            Task::T3 => Self {
                task,
                dataset_file: "T3_dataset.json",
                variant: ReactVariant::MultiTurn,
                backend: ToolBackend::Simulated,
                output_suffix: "_llm_tools",
            },
        }
    }

    pub fn with_backend(mut self, backend: ToolBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn dataset_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(self.dataset_file)
    }

    /// `t1_react_results.json`, `t3_cot_results_llm_tools.json`, ...
    pub fn results_file_name(&self, method: Method) -> String {
        format!("{}_{}_results{}.json", self.task, method, self.output_suffix)
    }

    pub fn prompt_path(&self, prompt_dir: &Path, name: &str) -> PathBuf {
        prompt_dir.join(format!("{}_{}.txt", self.task, name))
    }
}

/// System prompts for one method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSet {
    Cot {
        system: String,
    },
    React {
        /// Tool-selection prompt.
        thought: String,
        /// Continuation (multi-turn) or final-answer (single-step) prompt.
        observation: String,
    },
}

fn read_prompt(path: PathBuf) -> Result<String> {
    std::fs::read_to_string(&path).map_err(|source| DatewiseError::PromptNotFound { path, source })
}

impl PromptSet {
    /// Load only the files `method` needs from `prompt_dir`.
    pub fn load(prompt_dir: &Path, profile: &TaskProfile, method: Method) -> Result<Self> {
        match method {
            Method::Cot => Ok(Self::Cot {
                system: read_prompt(profile.prompt_path(prompt_dir, "cot"))?,
            }),
            Method::React => Ok(Self::React {
                thought: read_prompt(profile.prompt_path(prompt_dir, "react_thought"))?,
                observation: read_prompt(profile.prompt_path(prompt_dir, "react_observation"))?,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_name_their_outputs() {
        let t1 = TaskProfile::for_task(Task::T1);
        assert_eq!(t1.results_file_name(Method::React), "t1_react_results.json");
        assert_eq!(t1.variant, ReactVariant::SingleStep);
        assert_eq!(t1.backend, ToolBackend::Live);

        let t3 = TaskProfile::for_task(Task::T3);
        assert_eq!(
            t3.results_file_name(Method::Cot),
            "t3_cot_results_llm_tools.json"
        );
        assert_eq!(t3.dataset_path(Path::new("data")), Path::new("data/T3_dataset.json"));
        assert_eq!(t3.backend, ToolBackend::Simulated);
        assert_eq!(
            t3.with_backend(ToolBackend::Live).backend,
            ToolBackend::Live
        );
    }

    #[test]
    fn only_needed_prompts_are_loaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("t1_cot.txt"), "cot prompt").expect("write");
        let profile = TaskProfile::for_task(Task::T1);

        let cot = PromptSet::load(dir.path(), &profile, Method::Cot).expect("cot loads");
        assert_eq!(
            cot,
            PromptSet::Cot {
                system: "cot prompt".into()
            }
        );

        let err = PromptSet::load(dir.path(), &profile, Method::React).expect_err("missing");
        match err {
            DatewiseError::PromptNotFound { path, .. } => {
                assert!(path.ends_with("t1_react_thought.txt"))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parse_cli_values() {
        assert_eq!("T3".parse::<Task>(), Ok(Task::T3));
        assert_eq!("cot".parse::<Method>(), Ok(Method::Cot));
        assert!("tot".parse::<Method>().is_err());
    }
}

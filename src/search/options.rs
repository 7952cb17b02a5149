use anyhow::Context;
use serde::Deserialize;

/// methods for scoring a never-visited edge during selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InitQ {
    /// score zero
    Zero,
    /// score with the parent's cached network value
    ParentNnEval,
    /// score with the parent's current live mean value
    ParentLiveQ,
}

/// per-node selection behavior
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase", default)]
pub struct NodeOptions {
    /// mixing ratio for dirichlet noise at the root
    pub dir_eps: f32,
    /// concentration of the dirichlet noise
    pub dir_alpha: f32,
    /// exploration constant weighing U against Q
    pub u_weight: f32,
    /// how to score unvisited edges
    pub init_q_method: InitQ,
    /// divide accumulated value by N instead of N + 1
    pub take_true_q_avg: bool,
}

impl Default for NodeOptions {
    fn default() -> Self {
        Self {
            dir_eps: 0.25,
            dir_alpha: 0.2,
            u_weight: 1.1,
            init_q_method: InitQ::Zero,
            take_true_q_avg: false,
        }
    }
}

/// tree-wide search behavior, read once per process from the UCT
/// options file. unknown keys are configuration errors.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct TreeOptions {
    /// mix dirichlet noise into the root priors on first evaluation
    #[serde(default = "default_true")]
    pub add_noise: bool,
    /// evaluate leaves under a uniformly random symmetry
    #[serde(default = "default_true")]
    pub symmetrize_state: bool,
    pub node_options: NodeOptions,
}

fn default_true() -> bool {
    true
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            add_noise: true,
            symmetrize_state: true,
            node_options: NodeOptions::default(),
        }
    }
}

impl TreeOptions {
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("open uct options {}", path.display()))?;
        serde_json::from_reader(std::io::BufReader::new(file))
            .with_context(|| format!("parse uct options {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_keys() {
        let options: TreeOptions = serde_json::from_str(r#"{ "nodeOptions": {} }"#).expect("parses");
        assert!(options.add_noise);
        assert!(options.symmetrize_state);
        assert!(options.node_options.dir_eps == 0.25);
        assert!(options.node_options.dir_alpha == 0.2);
        assert!(options.node_options.u_weight == 1.1);
        assert!(options.node_options.init_q_method == InitQ::Zero);
        assert!(!options.node_options.take_true_q_avg);
    }

    #[test]
    fn enum_variants_parse_from_screaming_case() {
        let json = r#"{ "nodeOptions": { "initQMethod": "PARENT_NN_EVAL" } }"#;
        let options: TreeOptions = serde_json::from_str(json).expect("parses");
        assert!(options.node_options.init_q_method == InitQ::ParentNnEval);
        let json = r#"{ "nodeOptions": { "initQMethod": "PARENT_LIVE_Q" } }"#;
        let options: TreeOptions = serde_json::from_str(json).expect("parses");
        assert!(options.node_options.init_q_method == InitQ::ParentLiveQ);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let json = r#"{ "nodeOptions": {}, "noSuchOption": 1 }"#;
        assert!(serde_json::from_str::<TreeOptions>(json).is_err());
        let json = r#"{ "nodeOptions": { "noSuchOption": 1 } }"#;
        assert!(serde_json::from_str::<TreeOptions>(json).is_err());
    }

    #[test]
    fn node_options_are_required() {
        assert!(serde_json::from_str::<TreeOptions>("{}").is_err());
    }
}

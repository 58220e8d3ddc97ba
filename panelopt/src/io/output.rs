use crate::config::OptConfig;
use panelcut::io::ext_repr::{ExtInstance, ExtSolution};
use panelcut::lamination::EdgingTotals;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone)]
pub struct JobOutput {
    #[serde(flatten)]
    pub instance: ExtInstance,
    /// One solution per material group
    pub solutions: Vec<ExtSolution>,
    /// Edging required for all finished parts, per thickness
    pub edging_by_thickness: EdgingTotals,
    pub config: OptConfig,
}

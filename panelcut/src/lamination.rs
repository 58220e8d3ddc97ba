use crate::entities::{BoardRole, EdgeBanding, LaminationType, PartSpec};
use itertools::Itertools;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Edging thickness (mm) of a part made out of a single board
pub const SINGLE_BOARD_EDGING: u32 = 16;
/// Edging thickness (mm) of a part made out of two boards
pub const DOUBLE_BOARD_EDGING: u32 = 32;

/// Total edge banding length (mm) per edging thickness (mm)
pub type EdgingTotals = BTreeMap<u32, f64>;

/// Identifies the stock a board has to be cut from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialKey {
    pub material_id: Option<String>,
    pub role: BoardRole,
}

impl MaterialKey {
    pub fn new(material_id: Option<String>, role: BoardRole) -> Self {
        MaterialKey { material_id, role }
    }
}

impl Display for MaterialKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let material = self.material_id.as_deref().unwrap_or("default");
        match self.role {
            BoardRole::Primary => write!(f, "{material}"),
            BoardRole::Backer => write!(f, "{material}_backer"),
        }
    }
}

/// A board that has to be cut, derived from a [`PartSpec`] and its lamination.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpandedPart {
    /// The board to cut. Carries no lamination, backers carry no banding.
    pub part: PartSpec,
    pub material: MaterialKey,
    /// Index of the originating part in the submitted list
    pub source_index: usize,
    /// Edging thickness and banded length attributed to this board, if any
    pub edging: Option<(u32, f64)>,
}

impl ExpandedPart {
    pub fn role(&self) -> BoardRole {
        self.material.role
    }
}

/// All boards derived from a list of parts, together with the required edging.
#[derive(Clone, Debug, Default)]
pub struct LaminationPlan {
    pub parts: Vec<ExpandedPart>,
    pub edging: EdgingTotals,
}

/// The boards of a [`LaminationPlan`] sharing a single [`MaterialKey`].
#[derive(Clone, Debug)]
pub struct MaterialGroup {
    pub key: MaterialKey,
    pub parts: Vec<PartSpec>,
    pub edging: EdgingTotals,
}

impl LaminationPlan {
    /// Groups the boards by material key, in order of first appearance.
    pub fn material_groups(&self) -> Vec<MaterialGroup> {
        let mut groups: Vec<MaterialGroup> = vec![];
        for exp in &self.parts {
            let group = match groups.iter().position(|g| g.key == exp.material) {
                Some(idx) => &mut groups[idx],
                None => {
                    groups.push(MaterialGroup {
                        key: exp.material.clone(),
                        parts: vec![],
                        edging: EdgingTotals::new(),
                    });
                    groups.last_mut().expect("group was just pushed")
                }
            };
            group.parts.push(exp.part.clone());
            if let Some((thickness, length)) = exp.edging {
                add_edging(&mut group.edging, thickness, length);
            }
        }
        groups
    }

    pub fn total_board_qty(&self) -> usize {
        self.parts.iter().map(|e| e.part.quantity).sum()
    }
}

/// Expands the lamination of all parts into boards and aggregates their edging per thickness.
pub fn expand_lamination(parts: &[PartSpec]) -> LaminationPlan {
    let expanded = parts
        .iter()
        .enumerate()
        .flat_map(|(idx, part)| expand_part(idx, part))
        .collect_vec();

    let mut edging = EdgingTotals::new();
    for (thickness, length) in expanded.iter().filter_map(|e| e.edging) {
        add_edging(&mut edging, thickness, length);
    }

    LaminationPlan {
        parts: expanded,
        edging,
    }
}

/// Boards required for a single part.
/// The edging of the finished part is attributed to its first primary board.
pub fn expand_part(source_index: usize, part: &PartSpec) -> Vec<ExpandedPart> {
    let board = PartSpec {
        lamination: LaminationType::None,
        ..part.clone()
    };
    let primary_key = MaterialKey::new(part.material_id.clone(), BoardRole::Primary);

    match &part.lamination {
        LaminationType::None => vec![ExpandedPart {
            edging: edging_of(part, part.quantity, SINGLE_BOARD_EDGING),
            part: board,
            material: primary_key,
            source_index,
        }],
        LaminationType::SameBoard => vec![ExpandedPart {
            edging: edging_of(part, part.quantity, DOUBLE_BOARD_EDGING),
            part: PartSpec {
                quantity: part.quantity * 2,
                ..board
            },
            material: primary_key,
            source_index,
        }],
        LaminationType::WithBacker => vec![
            ExpandedPart {
                edging: edging_of(part, part.quantity, DOUBLE_BOARD_EDGING),
                part: board.clone(),
                material: primary_key,
                source_index,
            },
            ExpandedPart {
                part: backer_board(board, None),
                material: MaterialKey::new(part.material_id.clone(), BoardRole::Backer),
                source_index,
                edging: None,
            },
        ],
        LaminationType::Custom(custom) if custom.layers.is_empty() => vec![ExpandedPart {
            edging: edging_of(part, part.quantity, SINGLE_BOARD_EDGING),
            part: board,
            material: primary_key,
            source_index,
        }],
        LaminationType::Custom(custom) => {
            let edged_layer = custom
                .layers
                .iter()
                .position(|l| l.role == BoardRole::Primary)
                .unwrap_or(0);
            custom
                .layers
                .iter()
                .enumerate()
                .map(|(i, layer)| {
                    let material_id = layer.material_id.clone().or(part.material_id.clone());
                    let layer_board = match layer.role {
                        BoardRole::Primary => PartSpec {
                            id: format!("{}_l{}", part.id, i + 1),
                            material_id: material_id.clone(),
                            ..board.clone()
                        },
                        BoardRole::Backer => backer_board(
                            PartSpec {
                                material_id: material_id.clone(),
                                ..board.clone()
                            },
                            Some(i + 1),
                        ),
                    };
                    let edging = match i == edged_layer {
                        true => edging_of(part, part.quantity, custom.final_thickness),
                        false => None,
                    };
                    ExpandedPart {
                        part: layer_board,
                        material: MaterialKey::new(material_id, layer.role),
                        source_index,
                        edging,
                    }
                })
                .collect_vec()
        }
    }
}

/// Banded length of `quantity` finished parts
pub fn edging_length(part: &PartSpec, quantity: usize) -> f64 {
    part.banding.banded_length(part.length, part.width) * quantity as f64
}

fn edging_of(part: &PartSpec, quantity: usize, thickness: u32) -> Option<(u32, f64)> {
    match part.banding.is_empty() {
        true => None,
        false => Some((thickness, edging_length(part, quantity))),
    }
}

fn backer_board(board: PartSpec, layer: Option<usize>) -> PartSpec {
    let id = match layer {
        Some(l) => format!("{}_l{}_backer", board.id, l),
        None => format!("{}_backer", board.id),
    };
    let label = format!("{} (backer)", board.display_label());
    PartSpec {
        id,
        label: Some(label),
        banding: EdgeBanding::NONE,
        ..board
    }
}

fn add_edging(totals: &mut EdgingTotals, thickness: u32, length: f64) {
    *totals.entry(thickness).or_insert(0.0) += length;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{CustomLamination, LaminationLayer};
    use float_cmp::approx_eq;

    #[test]
    fn plain_part_is_a_single_board() {
        let parts = [PartSpec::new("side", 720.0, 560.0, 2).with_banding(EdgeBanding {
            top: true,
            ..EdgeBanding::NONE
        })];
        let plan = expand_lamination(&parts);
        assert_eq!(plan.parts.len(), 1);
        assert_eq!(plan.parts[0].part.quantity, 2);
        assert!(approx_eq!(f64, plan.edging[&SINGLE_BOARD_EDGING], 1440.0));
    }

    #[test]
    fn same_board_doubles_quantity() {
        let parts = [PartSpec::new("top", 1200.0, 600.0, 3)
            .with_lamination(LaminationType::SameBoard)
            .with_banding(EdgeBanding::ALL)];
        let plan = expand_lamination(&parts);
        assert_eq!(plan.parts.len(), 1);
        assert_eq!(plan.parts[0].part.quantity, 6);
        //edging is counted per finished part, not per board
        assert!(approx_eq!(f64, plan.edging[&DOUBLE_BOARD_EDGING], 3.0 * 3600.0));
        assert!(!plan.edging.contains_key(&SINGLE_BOARD_EDGING));
    }

    #[test]
    fn backer_lands_in_its_own_material_group() {
        let parts = [PartSpec::new("door", 500.0, 300.0, 2)
            .with_lamination(LaminationType::WithBacker)
            .with_banding(EdgeBanding::ALL)];
        let plan = expand_lamination(&parts);
        let groups = plan.material_groups();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key.role, BoardRole::Primary);
        assert_eq!(groups[1].key.role, BoardRole::Backer);
        assert_eq!(groups[0].parts[0].quantity, 2);
        assert_eq!(groups[1].parts[0].quantity, 2);
        assert!(groups[1].parts[0].banding.is_empty());
        assert!(groups[1].edging.is_empty());
        assert!(approx_eq!(f64, plan.edging[&DOUBLE_BOARD_EDGING], 3200.0));
        assert_eq!(plan.edging.len(), 1);
    }

    #[test]
    fn custom_layers_use_final_thickness() {
        let custom = CustomLamination {
            layers: vec![
                LaminationLayer {
                    material_id: None,
                    role: BoardRole::Primary,
                },
                LaminationLayer {
                    material_id: Some("mdf".into()),
                    role: BoardRole::Backer,
                },
                LaminationLayer {
                    material_id: Some("mdf".into()),
                    role: BoardRole::Backer,
                },
            ],
            final_thickness: 48,
        };
        let parts = [PartSpec::new("bench", 1000.0, 400.0, 1)
            .with_material("oak")
            .with_lamination(LaminationType::Custom(custom))
            .with_banding(EdgeBanding::ALL)];
        let plan = expand_lamination(&parts);
        assert_eq!(plan.parts.len(), 3);
        assert_eq!(plan.parts[0].material.material_id.as_deref(), Some("oak"));

        let groups = plan.material_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].key.to_string(), "mdf_backer");
        assert_eq!(groups[1].parts.len(), 2);
        assert!(approx_eq!(f64, plan.edging[&48], 2800.0));
    }

    #[test]
    fn custom_without_layers_is_single_board() {
        let lam = LaminationType::Custom(CustomLamination {
            layers: vec![],
            final_thickness: 40,
        });
        let parts = [PartSpec::new("x", 400.0, 400.0, 1)
            .with_lamination(lam)
            .with_banding(EdgeBanding::ALL)];
        let plan = expand_lamination(&parts);
        assert_eq!(plan.parts.len(), 1);
        assert!(plan.edging.contains_key(&SINGLE_BOARD_EDGING));
    }
}

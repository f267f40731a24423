//! Bone hierarchy (parent-index table)
//!
//! A [`Hierarchy`] maps every bone index to its parent's index. Bone 0 is the
//! root and is its own parent. The reference humanoid skeleton recorded by the
//! capture rig is available as [`Hierarchy::reference`].
//!
//! The parent-before-child processing order used by relativization is computed
//! once on construction, so hierarchies whose parents come after their children
//! in index order are still processed correctly.

use hashbrown::{HashMap, HashSet};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Number of bones in the reference skeleton
pub const REFERENCE_BONE_COUNT: usize = 28;

/// Bone names of the reference skeleton, in capture column order
pub const REFERENCE_BONES: [&str; REFERENCE_BONE_COUNT] = [
    "Hips",
    "LeftUpLeg",
    "LeftLeg",
    "LeftFoot",
    "LeftToeBase",
    "LeftToeEnd",
    "RightUpLeg",
    "RightLeg",
    "RightFoot",
    "RightToeBase",
    "RightToeEnd",
    "Spine",
    "Head",
    "HeadEnd",
    "LeftShoulder",
    "LeftArm",
    "LeftForeArm",
    "LeftHand",
    "LeftHandEnd",
    "LeftHandThumb1",
    "LeftHandThumb2",
    "RightShoulder",
    "RightArm",
    "RightForeArm",
    "RightHand",
    "RightHandEnd",
    "RightHandThumb1",
    "RightHandThumb2",
];

/// Parent index of every reference bone (e.g. Head (12) -> Spine (11))
pub const REFERENCE_PARENTS: [usize; REFERENCE_BONE_COUNT] = [
    0,  // Hips: root
    0,  // LeftUpLeg -> Hips
    1,  // LeftLeg -> LeftUpLeg
    2,  // LeftFoot -> LeftLeg
    3,  // LeftToeBase -> LeftFoot
    4,  // LeftToeEnd -> LeftToeBase
    0,  // RightUpLeg -> Hips
    6,  // RightLeg -> RightUpLeg
    7,  // RightFoot -> RightLeg
    8,  // RightToeBase -> RightFoot
    9,  // RightToeEnd -> RightToeBase
    0,  // Spine -> Hips
    11, // Head -> Spine
    12, // HeadEnd -> Head
    11, // LeftShoulder -> Spine
    14, // LeftArm -> LeftShoulder
    15, // LeftForeArm -> LeftArm
    16, // LeftHand -> LeftForeArm
    17, // LeftHandEnd -> LeftHand
    17, // LeftHandThumb1 -> LeftHand
    19, // LeftHandThumb2 -> LeftHandThumb1
    11, // RightShoulder -> Spine
    21, // RightArm -> RightShoulder
    22, // RightForeArm -> RightArm
    23, // RightHand -> RightForeArm
    24, // RightHandEnd -> RightHand
    24, // RightHandThumb1 -> RightHand
    26, // RightHandThumb2 -> RightHandThumb1
];

/// Invalid hierarchy description
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    #[error("hierarchy has no bones")]
    Empty,

    #[error("{names} bone names but {parents} parent indices")]
    LengthMismatch { names: usize, parents: usize },

    #[error("root bone '{0}' must be its own parent")]
    RootNotSelfParented(String),

    #[error("bone '{bone}' has parent index {parent}, but there are only {count} bones")]
    ParentOutOfRange {
        bone: String,
        parent: usize,
        count: usize,
    },

    #[error("bone '{0}' is its own parent but is not the root")]
    SelfParented(String),

    #[error("bone '{0}' is not reachable from the root (cycle in hierarchy)")]
    Cycle(String),

    #[error("bone '{bone}' has unknown parent '{parent}'")]
    UnknownBone { bone: String, parent: String },

    #[error("duplicate bone name '{0}'")]
    DuplicateBone(String),
}

/// Validated parent-index table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hierarchy {
    names: Vec<String>,
    parents: Vec<usize>,
    /// Parent-before-child visiting order
    order: Vec<usize>,
}

impl Hierarchy {
    /// Build a hierarchy from bone names and parent indices
    pub fn new(names: Vec<String>, parents: Vec<usize>) -> Result<Self, HierarchyError> {
        if names.is_empty() {
            return Err(HierarchyError::Empty);
        }
        if names.len() != parents.len() {
            return Err(HierarchyError::LengthMismatch {
                names: names.len(),
                parents: parents.len(),
            });
        }
        if parents[0] != 0 {
            return Err(HierarchyError::RootNotSelfParented(names[0].clone()));
        }

        let count = names.len();
        for (bone, &parent) in parents.iter().enumerate().skip(1) {
            if parent >= count {
                return Err(HierarchyError::ParentOutOfRange {
                    bone: names[bone].clone(),
                    parent,
                    count,
                });
            }
            if parent == bone {
                return Err(HierarchyError::SelfParented(names[bone].clone()));
            }
        }

        if let Some(duplicate) = first_duplicate(&names) {
            return Err(HierarchyError::DuplicateBone(duplicate.to_string()));
        }

        let order = processing_order(&parents)
            .map_err(|bone| HierarchyError::Cycle(names[bone].clone()))?;

        Ok(Self {
            names,
            parents,
            order,
        })
    }

    /// The 28-bone reference humanoid skeleton
    pub fn reference() -> Self {
        let names = REFERENCE_BONES.iter().map(|s| s.to_string()).collect();
        let parents = REFERENCE_PARENTS.to_vec();
        // Ascending indices are already parent-before-child for this table
        let order = (0..REFERENCE_BONE_COUNT).collect();
        Self {
            names,
            parents,
            order,
        }
    }

    /// Build a hierarchy from `(bone, parent)` name pairs
    ///
    /// The first pair is the root and must name itself as its parent.
    pub fn from_named<S: AsRef<str>>(bones: &[(S, S)]) -> Result<Self, HierarchyError> {
        let names: Vec<String> = bones.iter().map(|(name, _)| name.as_ref().to_string()).collect();

        let parents = {
            let mut index: HashMap<&str, usize> = HashMap::with_capacity(names.len());
            for (i, name) in names.iter().enumerate() {
                if index.insert(name.as_str(), i).is_some() {
                    return Err(HierarchyError::DuplicateBone(name.clone()));
                }
            }

            bones
                .iter()
                .map(|(name, parent)| {
                    index
                        .get(parent.as_ref())
                        .copied()
                        .ok_or_else(|| HierarchyError::UnknownBone {
                            bone: name.as_ref().to_string(),
                            parent: parent.as_ref().to_string(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        Self::new(names, parents)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Parent index of `bone` (the root returns itself)
    pub fn parent(&self, bone: usize) -> usize {
        self.parents[bone]
    }

    pub fn is_root(&self, bone: usize) -> bool {
        bone == 0
    }

    pub fn name(&self, bone: usize) -> &str {
        &self.names[bone]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn parents(&self) -> &[usize] {
        &self.parents
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Bone indices ordered so every parent precedes its children
    pub fn processing_order(&self) -> &[usize] {
        &self.order
    }

    /// Sampled bone names that differ from this hierarchy's names
    ///
    /// Returns `(index, expected, found)`; comparison ignores ASCII case.
    /// Extra or missing bones are not reported here.
    pub fn mismatched_names<'a>(&'a self, names: &'a [String]) -> Vec<(usize, &'a str, &'a str)> {
        self.names
            .iter()
            .zip(names)
            .enumerate()
            .filter(|(_, (expected, found))| !expected.eq_ignore_ascii_case(found))
            .map(|(i, (expected, found))| (i, expected.as_str(), found.as_str()))
            .collect()
    }
}

/// First name that occurs more than once
fn first_duplicate(names: &[String]) -> Option<&str> {
    let mut seen = HashSet::with_capacity(names.len());
    for name in names {
        if !seen.insert(name.as_str()) {
            return Some(name.as_str());
        }
    }
    None
}

/// Topological order taking the lowest ready index first
///
/// Returns the lowest bone index that cannot be reached from the root on failure.
fn processing_order(parents: &[usize]) -> Result<Vec<usize>, usize> {
    let count = parents.len();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); count];
    for (bone, &parent) in parents.iter().enumerate().skip(1) {
        children[parent].push(bone);
    }

    let mut order = Vec::with_capacity(count);
    let mut ready = BinaryHeap::new();
    ready.push(Reverse(0usize));

    while let Some(Reverse(bone)) = ready.pop() {
        order.push(bone);
        ready.extend(children[bone].iter().map(|&c| Reverse(c)));
    }

    if order.len() < count {
        let mut visited = vec![false; count];
        for &bone in &order {
            visited[bone] = true;
        }
        let unreachable = visited.iter().position(|v| !v).unwrap_or(0);
        return Err(unreachable);
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_reference_hierarchy() {
        let h = Hierarchy::reference();
        assert_eq!(h.len(), 28);
        assert_eq!(h.parent(0), 0);
        assert!(h.is_root(0));
        assert_eq!(h.name(12), "Head");
        assert_eq!(h.parent(12), 11);
        assert_eq!(h.parent(h.index_of("RightHandThumb2").unwrap()), 26);
        assert_eq!(h.parent(h.index_of("LeftHandThumb1").unwrap()), 17);
    }

    #[test]
    fn test_reference_passes_validation() {
        let validated =
            Hierarchy::new(names(&REFERENCE_BONES), REFERENCE_PARENTS.to_vec()).unwrap();
        assert_eq!(validated, Hierarchy::reference());
    }

    #[test]
    fn test_reference_order_is_ascending() {
        let h = Hierarchy::reference();
        let ascending: Vec<usize> = (0..28).collect();
        assert_eq!(h.processing_order(), ascending.as_slice());
    }

    #[test]
    fn test_order_puts_parents_first() {
        // root -> 3 -> 1 -> 2: children stored before their parents
        let h = Hierarchy::new(names(&["root", "b", "c", "a"]), vec![0, 3, 1, 0]).unwrap();
        assert_eq!(h.processing_order(), &[0, 3, 1, 2]);

        let mut position = [0usize; 4];
        for (i, &bone) in h.processing_order().iter().enumerate() {
            position[bone] = i;
        }
        for bone in 1..4 {
            assert!(position[h.parent(bone)] < position[bone]);
        }
    }

    #[test]
    fn test_empty() {
        assert_eq!(
            Hierarchy::new(Vec::new(), Vec::new()),
            Err(HierarchyError::Empty)
        );
    }

    #[test]
    fn test_length_mismatch() {
        assert_eq!(
            Hierarchy::new(names(&["a", "b"]), vec![0]),
            Err(HierarchyError::LengthMismatch {
                names: 2,
                parents: 1
            })
        );
    }

    #[test]
    fn test_root_must_self_parent() {
        assert_eq!(
            Hierarchy::new(names(&["a", "b"]), vec![1, 0]),
            Err(HierarchyError::RootNotSelfParented("a".into()))
        );
    }

    #[test]
    fn test_parent_out_of_range() {
        assert_eq!(
            Hierarchy::new(names(&["a", "b"]), vec![0, 5]),
            Err(HierarchyError::ParentOutOfRange {
                bone: "b".into(),
                parent: 5,
                count: 2
            })
        );
    }

    #[test]
    fn test_second_root_rejected() {
        assert_eq!(
            Hierarchy::new(names(&["a", "b"]), vec![0, 1]),
            Err(HierarchyError::SelfParented("b".into()))
        );
    }

    #[test]
    fn test_cycle_detected() {
        assert_eq!(
            Hierarchy::new(names(&["a", "b", "c"]), vec![0, 2, 1]),
            Err(HierarchyError::Cycle("b".into()))
        );
    }

    #[test]
    fn test_duplicate_names() {
        assert_eq!(
            Hierarchy::new(names(&["a", "b", "b"]), vec![0, 0, 0]),
            Err(HierarchyError::DuplicateBone("b".into()))
        );
    }

    #[test]
    fn test_new_keeps_names_after_duplicate_check() {
        let h = Hierarchy::new(names(&["a", "b", "c"]), vec![0, 0, 1]).unwrap();
        assert_eq!(h.names(), names(&["a", "b", "c"]).as_slice());
        assert_eq!(first_duplicate(h.names()), None);
        assert_eq!(first_duplicate(&names(&["a", "b", "a", "b"])), Some("a"));
    }

    #[test]
    fn test_from_named_duplicate() {
        assert_eq!(
            Hierarchy::from_named(&[("hips", "hips"), ("hips", "hips")]),
            Err(HierarchyError::DuplicateBone("hips".into()))
        );
    }

    #[test]
    fn test_from_named() {
        let h = Hierarchy::from_named(&[
            ("hips", "hips"),
            ("spine", "hips"),
            ("head", "spine"),
            ("leg", "hips"),
        ])
        .unwrap();
        assert_eq!(h.parents(), &[0, 0, 1, 0]);
        assert_eq!(h.index_of("head"), Some(2));
    }

    #[test]
    fn test_from_named_unknown_parent() {
        let err = Hierarchy::from_named(&[("hips", "hips"), ("spine", "pelvis")]).unwrap_err();
        assert_eq!(
            err,
            HierarchyError::UnknownBone {
                bone: "spine".into(),
                parent: "pelvis".into()
            }
        );
    }

    #[test]
    fn test_mismatched_names() {
        let h = Hierarchy::from_named(&[("Hips", "Hips"), ("Spine", "Hips")]).unwrap();
        let sampled = names(&["hips", "Chest"]);
        assert_eq!(h.mismatched_names(&sampled), vec![(1, "Spine", "Chest")]);
    }
}

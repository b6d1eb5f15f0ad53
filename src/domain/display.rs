//! Rendering decay trees as descriptors and as terminal trees.

use std::fmt;

use termtree::Tree;

use crate::domain::node::DecayNode;
use crate::domain::particle::ParticleTable;

/// Descriptor rendering of a canonical tree, e.g. `D*+ -> [D0 -> pi+ K+] pi+`.
pub struct DecayDisplay<'a> {
    node: &'a DecayNode,
    table: &'a ParticleTable,
}

impl DecayNode {
    /// Render with particle names from `table`.
    pub fn display<'a>(&'a self, table: &'a ParticleTable) -> DecayDisplay<'a> {
        DecayDisplay { node: self, table }
    }
}

impl fmt::Display for DecayDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table.display_name(self.node.particle_id()))?;
        if self.node.is_leaf() {
            return Ok(());
        }
        write!(f, " ->")?;
        for child in self.node.children() {
            if child.is_leaf() {
                write!(f, " {}", child.display(self.table))?;
            } else {
                write!(f, " [{}]", child.display(self.table))?;
            }
        }
        Ok(())
    }
}

/*
Workaround for error: https://doc.rust-lang.org/error_codes/E0116.html
termtree::Tree is foreign, so conversion lives in a trait.
 */
pub trait TreeNodeConvert {
    fn to_tree_string(&self, table: &ParticleTable) -> Tree<String>;
}

impl TreeNodeConvert for DecayNode {
    fn to_tree_string(&self, table: &ParticleTable) -> Tree<String> {
        let leaves: Vec<_> = self
            .children()
            .iter()
            .map(|c| c.to_tree_string(table))
            .collect();
        Tree::new(table.display_name(self.particle_id())).with_leaves(leaves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::descriptor::parse_pattern;
    use crate::domain::node::MatchPolicy;
    use crate::domain::record::McParticle;

    #[test]
    fn given_pattern_when_displaying_then_renders_canonical_descriptor() {
        let table = ParticleTable::new();
        let policy = MatchPolicy::default();
        let node = parse_pattern("D*+ -> [D0 -> K- pi+] pi+", &table, &policy).unwrap();
        assert_eq!(
            node.display(&table).to_string(),
            "D*+ -> pi+ [D0 -> pi+ K+]"
        );
    }

    #[test]
    fn given_rendered_descriptor_when_parsing_again_then_same_tree() {
        let table = ParticleTable::new();
        let policy = MatchPolicy::default();
        let node = parse_pattern(
            "B0 -> [D*- -> [anti-D0 -> K+ pi- pi- pi+] pi-] pi+",
            &table,
            &policy,
        )
        .unwrap();
        let rendered = node.display(&table).to_string();
        let reparsed = parse_pattern(&rendered, &table, &policy).unwrap();
        assert_eq!(node, reparsed);
    }

    #[test]
    fn given_record_with_unnamed_code_when_rendering_then_number_parses_back() {
        let table = ParticleTable::new();
        let policy = MatchPolicy::default();
        let record = McParticle::with_daughters(
            421,
            vec![McParticle::new(211), McParticle::new(-9999)],
        );
        let node = DecayNode::from_record(&record, &policy);

        let rendered = node.display(&table).to_string();
        assert_eq!(rendered, "D0 -> pi+ 9999");

        let reparsed = parse_pattern(&rendered, &table, &policy).unwrap();
        assert_eq!(node, reparsed);
    }

    #[test]
    fn given_pattern_when_converting_then_tree_has_one_line_per_node() {
        let table = ParticleTable::new();
        let policy = MatchPolicy::default();
        let node = parse_pattern("D0 -> K- pi+", &table, &policy).unwrap();
        let rendered = node.to_tree_string(&table).to_string();
        assert_eq!(rendered.lines().count(), 3);
        assert!(rendered.starts_with("D0"));
    }
}

use std::collections::HashMap;

use crate::model::{DrugGroup, TaggedRecord};

/// Group records by exact drug name in one pass.
///
/// Groups come back in first-seen order; variants inside a group keep input
/// order. The index map only points into the ordered `Vec`.
pub fn group_by_drug_name(records: &[TaggedRecord]) -> Vec<DrugGroup> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<DrugGroup> = Vec::new();

    for record in records {
        let name = record.drug_name();
        let slot = *index.entry(name).or_insert_with(|| {
            groups.push(DrugGroup::new(name));
            groups.len() - 1
        });
        let group = &mut groups[slot];
        match record {
            TaggedRecord::Teamsters(r) => group.teamsters.push(r.clone()),
            TaggedRecord::Wellcentra(r) => group.wellcentra.push(r.clone()),
        }
    }

    groups
}

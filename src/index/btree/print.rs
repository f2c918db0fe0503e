use serde_json::{json, Value as Json};

use super::IndexFile;
use crate::common::{AttrType, Attribute, PageId, Result, Rid, Value};

impl IndexFile {
    /// Render the tree as JSON, pre-order.
    ///
    /// Internal nodes print as `{"keys":[..],"children":[..]}` with one key
    /// per separator value. Leaves print as `{"keys":[..]}` where each key
    /// groups the RIDs that share a value, e.g. `"5:[(1,0),(1,2)]"`.
    pub fn print_btree(&mut self, attr: &Attribute) -> Result<String> {
        let root = self.root();
        let tree = if root.is_valid() {
            self.node_json(attr.attr_type, root)?
        } else {
            json!({ "keys": [] })
        };
        Ok(tree.to_string())
    }

    fn node_json(&mut self, ty: AttrType, page_id: PageId) -> Result<Json> {
        let node = self.load(page_id)?;

        if node.is_leaf() {
            let mut groups: Vec<(Value, Vec<Rid>)> = Vec::new();
            for (key, _, _) in node.leaf_entries(ty)? {
                match groups.last_mut() {
                    Some((value, rids)) if *value == key.value => rids.push(key.rid),
                    _ => groups.push((key.value, vec![key.rid])),
                }
            }
            let keys: Vec<String> = groups
                .iter()
                .map(|(value, rids)| {
                    let rids: Vec<String> = rids.iter().map(Rid::to_string).collect();
                    format!("{}:[{}]", value, rids.join(","))
                })
                .collect();
            return Ok(json!({ "keys": keys }));
        }

        let entries = node.internal_entries(ty)?;
        let keys: Vec<String> = entries.iter().map(|e| e.key.value.to_string()).collect();
        let mut children = vec![self.node_json(ty, node.first_child())?];
        for entry in &entries {
            children.push(self.node_json(ty, entry.child)?);
        }
        Ok(json!({ "keys": keys, "children": children }))
    }
}

use std::collections::HashMap;

/// Ground node number.
pub const GROUND: usize = 0;

/// Circuit node numbering shared by every device.
///
/// Node `0` is ground. Internal nodes created by devices are named
/// `<instance>#<suffix>` and may be released again on unsetup; released
/// numbers are handed out again before new ones are minted so the MNA
/// dimension stays stable across setup/unsetup cycles.
#[derive(Debug, Clone)]
pub struct NodeTable {
    names: Vec<Option<String>>,
    lookup: HashMap<String, usize>,
    free: Vec<usize>,
}

impl Default for NodeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTable {
    pub fn new() -> Self {
        let mut lookup = HashMap::new();
        lookup.insert("0".to_string(), GROUND);
        Self {
            names: vec![Some("0".to_string())],
            lookup,
            free: Vec::new(),
        }
    }

    /// Number of an external node, created on first use.
    pub fn node(&mut self, name: &str) -> usize {
        if let Some(&index) = self.lookup.get(name) {
            return index;
        }
        self.insert(name.to_string())
    }

    /// Create the internal node `<instance>#<suffix>`.
    pub fn make_internal(&mut self, instance: &str, suffix: &str) -> usize {
        let name = format!("{instance}#{suffix}");
        if let Some(&index) = self.lookup.get(&name) {
            return index;
        }
        self.insert(name)
    }

    fn insert(&mut self, name: String) -> usize {
        let index = match self.free.pop() {
            Some(index) => {
                self.names[index] = Some(name.clone());
                index
            }
            None => {
                self.names.push(Some(name.clone()));
                self.names.len() - 1
            }
        };
        self.lookup.insert(name, index);
        index
    }

    /// Give an internal node back. Ground and unknown numbers are ignored.
    pub fn release(&mut self, node: usize) {
        if node == GROUND {
            return;
        }
        if let Some(slot) = self.names.get_mut(node)
            && let Some(name) = slot.take()
        {
            self.lookup.remove(&name);
            self.free.push(node);
        }
    }

    pub fn name(&self, node: usize) -> Option<&str> {
        self.names.get(node).and_then(|n| n.as_deref())
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    /// Row/column of `node` in the MNA system; ground has none.
    pub fn mna_index(&self, node: usize) -> Option<usize> {
        if node == GROUND { None } else { Some(node - 1) }
    }

    /// Number of live nodes, ground included.
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    /// Dimension of the MNA system spanned by the node numbers handed out so far.
    pub fn mna_dim(&self) -> usize {
        self.names.len() - 1
    }
}

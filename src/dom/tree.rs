use super::*;

const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROW_SIZE: usize = 1024 * 1024;

impl Dom {
    pub(crate) fn children(&self, node_id: NodeId) -> &[NodeId] {
        self.nodes
            .get(node_id.0)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn collect_elements_dfs(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            if matches!(self.nodes[node_id.0].node_type, NodeType::Element(_)) {
                out.push(node_id);
            }
            for child in &self.nodes[node_id.0].children {
                self.collect_elements_dfs(*child, out);
            }
        })
    }

    pub(crate) fn collect_elements_descendants_dfs(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        for child in &self.nodes[node_id.0].children {
            self.collect_elements_dfs(*child, out);
        }
    }

    pub(crate) fn all_element_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_elements_dfs(self.root, &mut out);
        out
    }

    pub(crate) fn descendant_elements(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_elements_descendants_dfs(node_id, &mut out);
        out
    }

    pub(crate) fn descendants_by_tag(&self, node_id: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendant_elements(node_id)
            .into_iter()
            .filter(|candidate| self.has_tag(*candidate, tag))
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn is_descendant_of(&self, node_id: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = self.parent(node_id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    pub(crate) fn find_ancestor_by_tag(&self, node_id: NodeId, tag: &str) -> Option<NodeId> {
        let mut cursor = self.parent(node_id);
        while let Some(current) = cursor {
            if self.has_tag(current, tag) {
                return Some(current);
            }
            cursor = self.parent(current);
        }
        None
    }

    #[cfg(test)]
    pub(crate) fn is_connected(&self, node_id: NodeId) -> bool {
        node_id == self.root || self.is_descendant_of(node_id, self.root)
    }

    pub(crate) fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.ensure_insertable(parent, child, "appendChild")?;
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        self.rebuild_id_index();
        Ok(())
    }

    pub(crate) fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<()> {
        self.ensure_insertable(parent, child, "insertBefore")?;
        if self.parent(reference) != Some(parent) {
            return Err(Error::Dom(
                "insertBefore reference is not a direct child".into(),
            ));
        }
        if child == reference {
            return Ok(());
        }

        self.detach(child);
        let Some(index) = self.nodes[parent.0]
            .children
            .iter()
            .position(|id| *id == reference)
        else {
            return Err(Error::Dom("insertBefore reference is missing".into()));
        };

        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(index, child);
        self.rebuild_id_index();
        Ok(())
    }

    /// Inserts `child` as the previous sibling of `target`.
    pub(crate) fn insert_before_node(&mut self, target: NodeId, child: NodeId) -> Result<()> {
        let parent = self
            .parent(target)
            .ok_or_else(|| Error::Dom("before target is detached".into()))?;
        self.insert_before(parent, child, target)
    }

    /// Inserts `child` as the next sibling of `target`.
    pub(crate) fn insert_after(&mut self, target: NodeId, child: NodeId) -> Result<()> {
        let parent = self
            .parent(target)
            .ok_or_else(|| Error::Dom("after target is detached".into()))?;
        let pos = self.nodes[parent.0]
            .children
            .iter()
            .position(|id| *id == target)
            .ok_or_else(|| Error::Dom("after target is detached".into()))?;
        let next = self.nodes[parent.0].children.get(pos + 1).copied();
        if let Some(next) = next {
            self.insert_before(parent, child, next)
        } else {
            self.append_child(parent, child)
        }
    }

    pub(crate) fn remove_node(&mut self, node: NodeId) -> Result<()> {
        if node == self.root {
            return Err(Error::Dom("cannot remove document root".into()));
        }
        if self.parent(node).is_none() {
            return Ok(());
        }
        self.detach(node);
        self.rebuild_id_index();
        Ok(())
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(old_parent) = self.parent(node) {
            self.nodes[old_parent.0].children.retain(|id| *id != node);
        }
        self.nodes[node.0].parent = None;
    }

    fn ensure_insertable(&self, parent: NodeId, child: NodeId, op: &str) -> Result<()> {
        if parent.0 >= self.nodes.len() || child.0 >= self.nodes.len() {
            return Err(Error::Dom(format!("{op} node is invalid")));
        }
        if matches!(self.nodes[parent.0].node_type, NodeType::Text(_)) {
            return Err(Error::Dom(format!("{op} target cannot have children")));
        }
        if child == self.root || child == parent {
            return Err(Error::Dom(format!("invalid {op} node")));
        }
        // parent must not be inside child's subtree
        let mut cursor = Some(parent);
        while let Some(node) = cursor {
            if node == child {
                return Err(Error::Dom(format!("{op} would create a cycle")));
            }
            cursor = self.parent(node);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(dom: &mut Dom, parent: NodeId, tag: &str, id: &str) -> NodeId {
        let mut attrs = HashMap::new();
        attrs.insert("id".to_string(), id.to_string());
        dom.create_element(parent, tag.to_string(), attrs)
    }

    #[test]
    fn insert_before_and_after_keep_sibling_order() -> Result<()> {
        let mut dom = Dom::new();
        let root = dom.root;
        let form = element(&mut dom, root, "form", "f");
        let a = element(&mut dom, form, "input", "a");
        let b = dom.create_detached_element("span");
        let c = dom.create_detached_element("div");

        dom.insert_after(a, b)?;
        dom.insert_before_node(a, c)?;
        assert_eq!(dom.children(form), &[c, a, b]);
        Ok(())
    }

    #[test]
    fn remove_node_drops_id_from_index() -> Result<()> {
        let mut dom = Dom::new();
        let root = dom.root;
        let form = element(&mut dom, root, "form", "f");
        let msg = element(&mut dom, form, "span", "msg");
        assert_eq!(dom.by_id("msg"), Some(msg));

        dom.remove_node(msg)?;
        assert_eq!(dom.by_id("msg"), None);
        assert!(!dom.is_connected(msg));
        Ok(())
    }

    #[test]
    fn append_child_rejects_cycles() {
        let mut dom = Dom::new();
        let root = dom.root;
        let outer = element(&mut dom, root, "div", "outer");
        let inner = element(&mut dom, outer, "div", "inner");
        assert!(matches!(
            dom.append_child(inner, outer),
            Err(Error::Dom(msg)) if msg.contains("cycle")
        ));
    }

    #[test]
    fn deep_trees_are_walked_without_overflow() {
        let mut dom = Dom::new();
        let mut parent = dom.root;
        for _ in 0..20_000 {
            parent = dom.create_element(parent, "div".into(), HashMap::new());
        }
        assert_eq!(dom.all_element_nodes().len(), 20_000);
    }
}

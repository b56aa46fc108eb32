use std::io::{Result, Write};

use nestree_visualize::{Drawer, Visualize};

use crate::{
    flatten::{FlatKind, FlatNode},
    node::{Node, NodeKind},
    record::CompositeKey,
};

impl Visualize for CompositeKey {
    fn visualize<W: Write>(&self, drawer: Drawer<W>) -> Result<Drawer<W>> {
        self.components().visualize(drawer)
    }
}

impl Visualize for Node {
    fn visualize<W: Write>(&self, mut drawer: Drawer<W>) -> Result<Drawer<W>> {
        drawer.write(format!("[{}] ", self.path.token()).as_bytes())?;
        drawer = self.composite_key.visualize(drawer)?;
        match &self.kind {
            NodeKind::Leaf(value) => {
                drawer.write(b" = ")?;
                drawer = value.visualize(drawer)?;
                drawer.write(format!(" #{}", self.root_hash).as_bytes())?;
            }
            NodeKind::SubtreeRoot(children) => {
                drawer.write(format!(" #{}", self.root_hash).as_bytes())?;
                drawer.down();
                for child in children {
                    drawer.newline()?;
                    drawer = child.visualize(drawer)?;
                }
                drawer.up();
            }
        }
        Ok(drawer)
    }
}

impl Visualize for FlatNode {
    fn visualize<W: Write>(&self, mut drawer: Drawer<W>) -> Result<Drawer<W>> {
        drawer.write(format!("[{}] ", self.path.token()).as_bytes())?;
        drawer = self.composite_key.visualize(drawer)?;
        if let FlatKind::Leaf(value) = self.kind {
            drawer.write(b" = ")?;
            drawer = value.visualize(drawer)?;
        }
        drawer.write(format!(" #{}", self.root_hash).as_bytes())?;
        Ok(drawer)
    }
}

/// Outline of a whole forest, one node per line, nested forests indented.
pub struct ForestView<'a>(pub &'a [Node]);

impl Visualize for ForestView<'_> {
    fn visualize<W: Write>(&self, mut drawer: Drawer<W>) -> Result<Drawer<W>> {
        drawer.write(b"forest")?;
        drawer.down();
        for node in self.0 {
            drawer.newline()?;
            drawer = node.visualize(drawer)?;
        }
        drawer.up();
        Ok(drawer)
    }
}

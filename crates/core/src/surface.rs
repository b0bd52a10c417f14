//! Display surfaces.
//!
//! A surface is an addressable region that shows exactly one view at a time.
//! [`Surface`] is a handle: cloning it yields another handle to the same
//! underlying node, and equality compares nodes, never names.
//!
//! ```
//! use navstack_core::surface::Surface;
//!
//! let main = Surface::new("main");
//! let same = main.clone();
//! let other = Surface::new("main");
//!
//! assert_eq!(main, same);
//! assert_ne!(main, other);
//! ```

use crate::view::ElementId;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Debug)]
struct SurfaceNode {
    name: String,
    mounted: RefCell<Vec<ElementId>>,
}

/// Handle to a display surface.
#[derive(Clone)]
pub struct Surface {
    node: Rc<SurfaceNode>,
}

impl Surface {
    pub fn new(name: impl Into<String>) -> Self {
        Surface {
            node: Rc::new(SurfaceNode {
                name: name.into(),
                mounted: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.node.name
    }

    /// Returns true if both handles resolve to the same node.
    #[inline]
    pub fn same_node(&self, other: &Surface) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }

    /// Appends an element to this surface.
    ///
    /// Mounting an element that is already mounted is a no-op.
    pub fn mount(&self, element: ElementId) {
        let mut mounted = self.node.mounted.borrow_mut();
        if !mounted.contains(&element) {
            mounted.push(element);
        }
    }

    /// Removes an element from this surface. Returns false if it was not mounted.
    pub fn detach(&self, element: ElementId) -> bool {
        let mut mounted = self.node.mounted.borrow_mut();
        match mounted.iter().position(|e| *e == element) {
            Some(index) => {
                mounted.remove(index);
                true
            }
            None => false,
        }
    }

    /// Elements currently mounted, in mount order.
    pub fn mounted(&self) -> Vec<ElementId> {
        self.node.mounted.borrow().clone()
    }

    pub fn is_mounted(&self, element: ElementId) -> bool {
        self.node.mounted.borrow().contains(&element)
    }
}

impl PartialEq for Surface {
    fn eq(&self, other: &Self) -> bool {
        self.same_node(other)
    }
}

impl Eq for Surface {}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("name", &self.node.name)
            .field("node", &Rc::as_ptr(&self.node))
            .finish()
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.node.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::IdFeeder;

    #[test]
    fn identity_is_by_node() {
        let a = Surface::new("body");
        let b = Surface::new("body");
        assert!(a.same_node(&a.clone()));
        assert!(!a.same_node(&b));
    }

    #[test]
    fn mount_is_shared_between_handles() {
        let feeder = IdFeeder::new();
        let surface = Surface::new("main");
        let alias = surface.clone();
        let element = feeder.next();

        surface.mount(element);
        surface.mount(element);

        assert_eq!(alias.mounted(), vec![element]);
        assert!(alias.detach(element));
        assert!(!surface.detach(element));
        assert!(surface.mounted().is_empty());
    }
}

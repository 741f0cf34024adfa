//! Iterative pre-order traversal shared by the raw tree and the bound tree.
//!
//! Nodes describe themselves as a short list of [`Step`]s; [`Flatten`] keeps those steps on an
//! explicit work stack, so the depth of a tree is limited by memory rather than by the call
//! stack.

use std::rc::Rc;

pub enum Step<'a, N, E> {
    Process(&'a N),
    Yield(E),
}

pub trait Node<'a>: Sized + 'a {
    type Event;

    /// Pushes the steps for this node in reverse order: the step to run first goes on top.
    fn expand(&'a self, to_do: &mut Vec<Step<'a, Self, Self::Event>>);
}

pub struct Flatten<'a, N: Node<'a>> {
    to_do: Vec<Step<'a, N, N::Event>>,
}

impl<'a, N: Node<'a>> Flatten<'a, N> {
    pub fn new(root: &'a N) -> Self {
        Self {
            to_do: vec![Step::Process(root)],
        }
    }
}

impl<'a, N: Node<'a>> Iterator for Flatten<'a, N> {
    type Item = N::Event;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.to_do.pop()? {
                Step::Process(node) => node.expand(&mut self.to_do),
                Step::Yield(event) => return Some(event),
            }
        }
    }
}

/// `Rc`-linked trees that can be taken apart without recursion.
///
/// The drop glue the compiler generates for such a tree recurses once per level, so a tree
/// deeper than the call stack allows is released through [`dismantle`] instead.
pub trait Dismantle: Sized {
    /// A childless node used as a stand-in for detached children.
    fn leaf() -> Rc<Self>;
    fn children(&self) -> [Option<&Rc<Self>>; 2];
    fn children_mut(&mut self) -> [Option<&mut Rc<Self>>; 2];
}

fn is_owned_subtree<N: Dismantle>(child: &Rc<N>) -> bool {
    Rc::strong_count(child) == 1
        && Rc::weak_count(child) == 0
        && child.children().iter().any(Option::is_some)
}

fn detach<N: Dismantle>(node: &mut N, leaf: &Rc<N>, pending: &mut Vec<Rc<N>>) {
    for child in node.children_mut().into_iter().flatten() {
        pending.push(std::mem::replace(child, leaf.clone()));
    }
}

/// Releases the subtrees only `root` holds, using an explicit stack. Called from `Drop`.
pub fn dismantle<N: Dismantle>(root: &mut N) {
    if !root.children().into_iter().flatten().any(is_owned_subtree) {
        return;
    }
    let leaf = N::leaf();
    let mut pending = vec![];
    detach(root, &leaf, &mut pending);
    while let Some(mut node) = pending.pop() {
        // Shared nodes only lose a reference here; their last owner takes them apart.
        if let Some(node) = Rc::get_mut(&mut node) {
            detach(node, &leaf, &mut pending);
        }
    }
}

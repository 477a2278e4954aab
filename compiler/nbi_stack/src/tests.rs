use super::*;

#[derive(Debug)]
#[allow(dead_code)]
enum Nested {
    Leaf(u32),
    Wrap(Box<Nested>),
}

fn build(depth: u32) -> Nested {
    let mut node = Nested::Leaf(depth);
    for _ in 0..depth {
        node = Nested::Wrap(Box::new(node));
    }
    node
}

fn depth_of(node: &Nested) -> u32 {
    ensure_sufficient_stack(|| match node {
        Nested::Leaf(_) => 0,
        Nested::Wrap(inner) => depth_of(inner) + 1,
    })
}

#[test]
fn passes_through_result() {
    assert_eq!(ensure_sufficient_stack(|| "done"), "done");
}

#[test]
fn walks_deeply_nested_tree() {
    let tree = build(200_000);
    assert_eq!(depth_of(&tree), 200_000);
    teardown(tree);
}

// Dropping a deep Box chain recursively would overflow on its own.
fn teardown(mut node: Nested) {
    while let Nested::Wrap(inner) = node {
        node = *inner;
    }
}

//! # CLI Command Implementations

use crate::api;
use arbor_core::{Direction, FamilyRegistry, KinRole, PersonAttrs, PersonId, TreeNode};

/// Start the HTTP server.
pub async fn cmd_serve(host: &str, port: u16) -> anyhow::Result<()> {
    let registry = FamilyRegistry::with_ttl(api::get_pending_ttl_from_env());
    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, registry).await
}

/// Build a three-generation sample family and print the rendered tree,
/// same-generation peers, and a couple of kinship labels.
pub fn cmd_demo() -> anyhow::Result<()> {
    let now = chrono::Utc::now().timestamp().max(0) as u64;
    let mut registry = FamilyRegistry::new();

    let ana = registry.register(PersonAttrs::named("Ana")).map(|p| p.id)?;

    // Each proposal is confirmed by its target, exactly as the HTTP flow
    // would drive it.
    let maria = add_confirmed(&mut registry, ana, "María", KinRole::Mother, now)?;
    let franco = add_confirmed(&mut registry, ana, "Franco", KinRole::Father, now)?;
    let delia = add_confirmed(&mut registry, maria, "Delia", KinRole::Mother, now)?;
    add_confirmed(&mut registry, maria, "Elsa", KinRole::Daughter, now)?;
    add_confirmed(&mut registry, delia, "Pedro", KinRole::Son, now)?;

    let (flor, spouse_link) = registry.propose_spouse(franco, PersonAttrs::named("Flor"), now)?;
    registry.resolve_confirmation(flor, spouse_link, true)?;

    println!("Family tree of Ana:\n");
    let tree = registry.tree(ana, Direction::Full, None)?;
    render_tree(&tree.root, "");

    println!("\nSame generation as Ana:");
    for peer in registry.same_generation(ana)? {
        println!("  - {} (id {})", peer.name, peer.id.0);
    }

    println!("\nKinship, seen from Ana:");
    for target in ["Delia", "Elsa", "Pedro", "Flor"] {
        println!("  - {} is Ana's {}", target, registry.kinship(ana, target)?);
    }
    Ok(())
}

/// Propose a new family member and confirm as the target.
fn add_confirmed(
    registry: &mut FamilyRegistry,
    proposer: PersonId,
    name: &str,
    role: KinRole,
    now: u64,
) -> anyhow::Result<PersonId> {
    let (member, link) =
        registry.propose_family_member(proposer, PersonAttrs::named(name), role, now)?;
    registry.resolve_confirmation(member, link, true)?;
    Ok(member)
}

/// Print a tree node with box-drawing indentation.
fn render_tree(node: &TreeNode, prefix: &str) {
    let spouse = node
        .spouse
        .as_ref()
        .map(|s| format!(" ⚭ {}", s.name))
        .unwrap_or_default();
    println!("{}{} (id {}){}", prefix, node.name, node.id.0, spouse);

    let child_prefix = format!("{}    ", prefix);
    for parent in &node.parents {
        println!("{}  ↑ parent:", prefix);
        render_tree(parent, &child_prefix);
    }
    for child in &node.children {
        println!("{}  ↓ child:", prefix);
        render_tree(child, &child_prefix);
    }
}

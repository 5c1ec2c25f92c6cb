//! Build an OAM schema for a small NanoAOD-style tree
//!
//! Run with: cargo run --example quickstart

use oamtree::{
    tree2oam_with_config, BranchDescription, CounterMap, ElementType, GroupingPolicy, OamConfig,
};

fn main() -> anyhow::Result<()> {
    let root = BranchDescription::node(
        "Events",
        vec![
            BranchDescription::leaf("run", ElementType::U32),
            BranchDescription::leaf("nJet", ElementType::I32),
            BranchDescription::leaf("Jet_pt", ElementType::F32),
            BranchDescription::leaf("Jet_eta", ElementType::F32),
            BranchDescription::leaf("Jet_phi", ElementType::F32),
        ],
    );
    let counters = CounterMap::from_pairs([
        ("Jet_pt", "nJet"),
        ("Jet_eta", "nJet"),
        ("Jet_phi", "nJet"),
    ]);

    let config = OamConfig {
        grouping: GroupingPolicy::Underscore,
        ..OamConfig::default()
    };

    // Jet_* fields share nJet, so they come out as one list of Jet records
    let oam = tree2oam_with_config(&root, &counters, &config);
    println!("{}", serde_json::to_string_pretty(&oam)?);

    Ok(())
}

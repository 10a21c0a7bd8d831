
use anyhow::Result;
use hapunfold::graph::Graph;
use hapunfold::node_mapping::NodeMapping;
use hapunfold::unfolder::{PhaseUnfolder, UnfoldStats};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use tempfile::TempDir;
use test_utils::*;

/// Two consecutive bubbles 1-{3,4}-5 and 5-{6,7}-8 with anchors 1, 5 and 8
fn two_bubbles() -> Pangenome {
    Pangenome::from_walks(
        vec![fwd(&[1, 2, 3, 5, 6, 8]), fwd(&[1, 2, 4, 5, 7, 8])],
        vec![1, 5, 8],
    )
}

fn pruned(pangenome: &Pangenome) -> Graph {
    induced(&pangenome.full, &pangenome.anchors)
}

#[test]
fn test_two_bubbles_layout() {
    let pangenome = two_bubbles();
    let mut graph = pruned(&pangenome);
    let mut unfolder = PhaseUnfolder::new(&pangenome.paths, &pangenome.threads, 9);
    let stats = unfolder.unfold(&mut graph);

    assert_eq!(
        stats,
        UnfoldStats {
            components: 1,
            complement_nodes: 8,
            complement_edges: 9,
            unfolded_nodes: 8,
            unfolded_edges: 9,
            haplotype_paths: 4,
        }
    );

    // 2 is shared by both haplotypes, everything else is duplicated once
    let duplicates: Vec<_> = unfolder.mapping().duplicates().collect();
    assert_eq!(duplicates, vec![(9, 2), (10, 3), (11, 4), (12, 6), (13, 7)]);

    let mut expected = vec![
        edge(1, 9),
        edge(9, 10),
        edge(9, 11),
        edge(10, 5),
        edge(11, 5),
        edge(5, 12),
        edge(12, 8),
        edge(5, 13),
        edge(13, 8),
    ];
    expected.sort();
    assert_eq!(graph.edges().collect::<Vec<_>>(), expected);
    assert_eq!(unfolder.verify_paths(&graph), 0);
}

#[test]
fn test_border_nodes_keep_ids() {
    let pangenome = two_bubbles();
    let before = pruned(&pangenome);
    let mut graph = before.clone();
    let mut unfolder = PhaseUnfolder::new(&pangenome.paths, &pangenome.threads, 9);
    unfolder.unfold(&mut graph);

    for node in before.nodes() {
        assert_eq!(graph.get_node(node.id), Some(node));
    }
    for (duplicate, original) in unfolder.mapping().duplicates() {
        assert_eq!(
            graph.get_node(duplicate).map(|n| n.sequence.clone()),
            Some(sequence_for(original))
        );
        assert!(!graph.has_node(original));
    }
}

#[test]
fn test_missing_edge_fails_only_dependent_thread() {
    let pangenome = two_bubbles();
    let mut graph = pruned(&pangenome);
    let mut unfolder = PhaseUnfolder::new(&pangenome.paths, &pangenome.threads, 9);
    unfolder.unfold(&mut graph);

    // 13 is the duplicate of 7, used only by the second haplotype. The 2 is
    // that one haplotype counted once per stored orientation.
    assert!(graph.remove_edge(edge(13, 8)));
    assert_eq!(unfolder.verify_paths(&graph), 2);
}

#[test]
fn test_unfolding_is_deterministic() {
    let pangenome = random_pangenome(7, 5, 3, 6);
    let mut rng = StdRng::seed_from_u64(11);
    let pruned = prune(&pangenome.full, &pangenome.anchors, 0.5, &mut rng);
    let next_node = pangenome.max_node_id() + 1;

    let run = || {
        let mut graph = pruned.clone();
        let mut unfolder = PhaseUnfolder::new(&pangenome.paths, &pangenome.threads, next_node);
        unfolder.unfold(&mut graph);
        (graph_to_gfa(&graph), unfolder.mapping().clone())
    };
    let (first_gfa, first_mapping) = run();
    let (second_gfa, second_mapping) = run();
    assert_eq!(first_gfa, second_gfa);
    assert_eq!(first_mapping, second_mapping);
}

#[test]
fn test_mapping_file_round_trip() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mapping_file = temp_dir.path().join("unfold.mapping");

    let pangenome = two_bubbles();
    let mut graph = pruned(&pangenome);
    let mut unfolder = PhaseUnfolder::new(&pangenome.paths, &pangenome.threads, 9);
    unfolder.unfold(&mut graph);
    unfolder.write_mapping(&mapping_file)?;
    assert_eq!(fs::metadata(&mapping_file)?.len(), 8 * (2 + 5));

    let mut reloaded = PhaseUnfolder::new(&pangenome.paths, &pangenome.threads, 100);
    reloaded.read_mapping(&mapping_file)?;
    assert_eq!(reloaded.mapping(), unfolder.mapping());
    for id in 1..=13 {
        assert_eq!(reloaded.get_mapping(id), unfolder.get_mapping(id));
    }
    Ok(())
}

#[test]
fn test_corrupt_mapping_is_rejected() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mapping_file = temp_dir.path().join("corrupt.mapping");

    let mut full = NodeMapping::new(9);
    full.insert(2);
    full.insert(3);
    full.save(&mapping_file)?;
    let bytes = fs::read(&mapping_file)?;
    fs::write(&mapping_file, &bytes[..bytes.len() - 4])?;

    let pangenome = two_bubbles();
    let mut unfolder = PhaseUnfolder::new(&pangenome.paths, &pangenome.threads, 42);
    let err = unfolder.read_mapping(&mapping_file).unwrap_err();
    assert!(format!("{err:#}").contains("truncated"));
    assert_eq!(unfolder.mapping(), &NodeMapping::new(42));

    let missing = temp_dir.path().join("missing.mapping");
    assert!(unfolder.read_mapping(&missing).is_err());
    Ok(())
}

#[test]
fn test_loaded_mapping_continues_numbering() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mapping_file = temp_dir.path().join("first.mapping");

    let pangenome = two_bubbles();
    let mut graph = pruned(&pangenome);
    let mut first = PhaseUnfolder::new(&pangenome.paths, &pangenome.threads, 9);
    first.unfold(&mut graph);
    first.write_mapping(&mapping_file)?;

    let mut graph = pruned(&pangenome);
    let mut second = PhaseUnfolder::new(&pangenome.paths, &pangenome.threads, 9);
    second.read_mapping(&mapping_file)?;
    second.unfold(&mut graph);

    assert_eq!(second.mapping().first_node(), 9);
    assert_eq!(second.mapping().len(), 10);
    assert_eq!(second.get_mapping(14), 2);
    assert!(graph.has_node(14));
    assert!(!graph.has_node(9));
    assert_eq!(second.verify_paths(&graph), 0);
    Ok(())
}

#[test]
fn test_restore_paths() {
    let pangenome = two_bubbles();
    let mut graph = pruned(&pangenome);
    let unfolder = PhaseUnfolder::new(&pangenome.paths, &pangenome.threads, 9);
    assert_eq!(unfolder.restore_paths(&mut graph), 5);

    let ids: Vec<_> = graph.nodes().map(|n| n.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 5, 6, 8]);
    assert!(unfolder.mapping().is_empty());

    // The reference and its thread verify; the other haplotype needs 4 and 7
    assert_eq!(unfolder.verify_paths(&graph), 2);
}

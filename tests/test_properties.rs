
use hapunfold::fold::ComponentFolder;
use hapunfold::handle::{Handle, Walk};
use hapunfold::node_mapping::NodeMapping;
use hapunfold::unfolder::PhaseUnfolder;
use proptest::collection::vec;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use test_utils::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: every path and thread can be spelled after unfolding
    #[test]
    fn prop_unfolded_graph_verifies(
        seed in any::<u64>(),
        sites in 1usize..6,
        max_alleles in 1usize..4,
        haplotypes in 1usize..6,
        drop_rate in 0.0f64..0.9,
    ) {
        let pangenome = random_pangenome(seed, sites, max_alleles, haplotypes);
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
        let pruned = prune(&pangenome.full, &pangenome.anchors, drop_rate, &mut rng);
        let next_node = pangenome.max_node_id() + 1;

        let mut graph = pruned.clone();
        let mut unfolder = PhaseUnfolder::new(&pangenome.paths, &pangenome.threads, next_node);
        unfolder.unfold(&mut graph);

        prop_assert_eq!(unfolder.verify_paths(&graph), 0);

        // Retained nodes and edges survive unchanged
        for node in pruned.nodes() {
            prop_assert_eq!(graph.get_node(node.id), Some(node));
        }
        for edge in pruned.edges() {
            prop_assert!(graph.has_edge(edge));
        }

        // Duplicates are fresh ids carrying their original's sequence
        for (duplicate, original) in unfolder.mapping().duplicates() {
            prop_assert!(duplicate >= next_node);
            prop_assert!(original < next_node);
            prop_assert!(!pruned.has_node(original));
            prop_assert_eq!(
                graph.get_node(duplicate).map(|n| n.sequence.clone()),
                Some(sequence_for(original))
            );
        }
    }

    /// Property: without pruning there is nothing to unfold
    #[test]
    fn prop_unpruned_graph_is_unchanged(
        seed in any::<u64>(),
        sites in 1usize..6,
        haplotypes in 1usize..5,
    ) {
        let pangenome = random_pangenome(seed, sites, 3, haplotypes);
        let mut graph = pangenome.full.clone();
        let mut unfolder = PhaseUnfolder::new(&pangenome.paths, &pangenome.threads, pangenome.max_node_id() + 1);
        let stats = unfolder.unfold(&mut graph);

        prop_assert_eq!(stats.components, 0);
        prop_assert!(unfolder.mapping().is_empty());
        prop_assert_eq!(graph_to_gfa(&graph), graph_to_gfa(&pangenome.full));
        prop_assert_eq!(unfolder.verify_paths(&graph), 0);
    }

    /// Property: a walk and its reverse complement fold identically
    #[test]
    fn prop_fold_ignores_orientation(
        ids in vec(1u64..20, 2..12),
        strands in vec(any::<bool>(), 12),
    ) {
        let walk = Walk::new(
            ids.iter()
                .zip(&strands)
                .map(|(&id, &is_reverse)| Handle::new(id, is_reverse))
                .collect(),
        );
        let border = [ids[0], ids[ids.len() - 1]].into_iter().collect();

        let mut forward = NodeMapping::new(100);
        let mut folder = ComponentFolder::new(border, &mut forward);
        folder.insert_walk(walk.clone());
        let crossing: Vec<_> = folder.crossing_edges().collect();
        drop(folder);

        let border = [ids[0], ids[ids.len() - 1]].into_iter().collect();
        let mut reverse = NodeMapping::new(100);
        let mut folder = ComponentFolder::new(border, &mut reverse);
        folder.insert_walk(walk.reverse_complement());
        prop_assert_eq!(folder.crossing_edges().collect::<Vec<_>>(), crossing);
        drop(folder);

        // Every position except the two ends gets one duplicate
        prop_assert_eq!(forward.len(), ids.len() - 2);
        prop_assert_eq!(forward, reverse);
    }
}

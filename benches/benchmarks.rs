use gridzero::game::connectfour::ConnectFour;
use gridzero::game::game::Game;
use gridzero::game::go::Go;
use gridzero::network::uniform::Uniform;
use gridzero::search::options::NodeOptions;
use gridzero::search::options::TreeOptions;
use gridzero::search::tree::Tree;
use gridzero::symmetry::d4::D4;
use gridzero::symmetry::mirror::Mirror;
use rand::SeedableRng;
use rand::rngs::SmallRng;

criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        applying_go_placements,
        masking_go_positions,
        searching_connect_four,
        searching_go,
}

fn quiet() -> TreeOptions {
    TreeOptions {
        add_noise: false,
        symmetrize_state: false,
        node_options: NodeOptions::default(),
    }
}

fn applying_go_placements(c: &mut criterion::Criterion) {
    c.bench_function("apply a Go opening move", |b| {
        let root = Go::root();
        b.iter(|| root.apply(24))
    });
}

fn masking_go_positions(c: &mut criterion::Criterion) {
    c.bench_function("walk a short Go line with full legality masks", |b| {
        b.iter(|| {
            [24, 9, 11, 39, 17]
                .iter()
                .fold(Go::root(), |node, &action| node.apply(action))
        })
    });
}

fn searching_connect_four(c: &mut criterion::Criterion) {
    c.bench_function("run 256 batched traversals of Connect Four", |b| {
        let mut network = Uniform::new(ConnectFour::ACTIONS);
        let mirror = Mirror::new(ConnectFour::COLS);
        b.iter(|| {
            let mut rng = SmallRng::seed_from_u64(0);
            let mut tree = Tree::new(ConnectFour::root(), quiet());
            tree.search(256, 16, 16, &mut network, &mirror, &mut rng);
            tree.root_visits()
        })
    });
}

fn searching_go(c: &mut criterion::Criterion) {
    c.bench_function("run 128 batched traversals of Go", |b| {
        let mut network = Uniform::new(Go::ACTIONS);
        let d4 = D4::new(Go::COLS);
        b.iter(|| {
            let mut rng = SmallRng::seed_from_u64(0);
            let mut tree = Tree::new(Go::root(), quiet());
            tree.search(128, 16, 16, &mut network, &d4, &mut rng);
            tree.root_visits()
        })
    });
}

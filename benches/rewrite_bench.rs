use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rerooter::config::{OrphanPolicy, PathMapping, Replacement, VerifyOptions};
use rerooter::rewrite::{
    apply_replacements_outside, rewrite_references, AbsPathMap, RebaseContext, SolutionFormat,
};
use rerooter::{build_sync_plan, AppConfig};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const PROJECTS: usize = 200;

fn bench_config() -> AppConfig {
    AppConfig {
        path_mappings: vec![PathMapping::new("OldCompany", "NewCompany")],
        verify: VerifyOptions {
            enabled: false,
            ..VerifyOptions::default()
        },
        ..AppConfig::default()
    }
}

fn solution_text() -> String {
    let mut text = String::from("Microsoft Visual Studio Solution File, Format Version 12.00\r\n");
    for i in 0..PROJECTS {
        let _ = write!(
            text,
            "Project(\"{{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}}\") = \"OldCompany.P{i}\", \
             \"src\\OldCompany.P{i}\\OldCompany.P{i}.csproj\", \"{{00000000-0000-0000-0000-{i:012}}}\"\r\nEndProject\r\n"
        );
    }
    text
}

fn populate(root: &Path) {
    for i in 0..PROJECTS {
        let dir = root.join(format!("src/OldCompany.P{i}"));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("OldCompany.P{i}.csproj")), "<Project />\n").unwrap();
        fs::write(dir.join("Program.cs"), "namespace OldCompany;\n").unwrap();
    }
    fs::write(root.join("App.sln"), solution_text()).unwrap();
}

fn build_plan_benchmark(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    populate(&src);
    let dst = dir.path().join("dst");
    let config = bench_config();

    c.bench_function("planner::build_sync_plan (400 files)", |b| {
        b.iter(|| build_sync_plan(black_box(&src), black_box(&dst), &config, false).unwrap())
    });
}

fn solution_rewrite_benchmark(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    populate(&src);
    let dst = dir.path().join("dst");
    let plan = build_sync_plan(&src, &dst, &bench_config(), false).unwrap();
    let abs_map = AbsPathMap::from_plan(&plan);
    let source_file = src.join("App.sln");
    let target_file = dst.join("App.sln");
    let content = solution_text();

    c.bench_function("rewrite::rewrite_references (solution)", |b| {
        let ctx = RebaseContext::new(&source_file, &target_file, &abs_map);
        b.iter(|| {
            rewrite_references(&SolutionFormat, black_box(&content), &ctx, OrphanPolicy::Warn)
                .unwrap()
        })
    });

    let replacements = [Replacement::new("OldCompany", "NewCompany")];
    let ctx = RebaseContext::new(&source_file, &target_file, &abs_map);
    let structural =
        rewrite_references(&SolutionFormat, &content, &ctx, OrphanPolicy::Warn).unwrap();
    c.bench_function("rewrite::apply_replacements_outside (solution)", |b| {
        b.iter(|| {
            apply_replacements_outside(
                black_box(&structural.text),
                &replacements,
                &structural.protected,
            )
        })
    });
}

criterion_group!(benches, build_plan_benchmark, solution_rewrite_benchmark);
criterion_main!(benches);

use std::path::{Path, PathBuf};

use wordcloud_core::{image_path_for, RunPlan, WordCloudConfig};

#[test]
fn default_image_is_basename_plus_png() {
    assert_eq!(image_path_for(Path::new("build/a.out"), None, 1), PathBuf::from("a.out.png"));
}

#[test]
fn single_target_override_is_used_verbatim() {
    let plan = RunPlan::new(
        WordCloudConfig { output: Some(PathBuf::from("out.png")), ..WordCloudConfig::default() },
        vec![PathBuf::from("/bin/true")],
    )
    .unwrap();
    assert_eq!(plan.image_path(&plan.targets[0]), PathBuf::from("out.png"));
}

#[test]
fn multi_target_override_becomes_prefix() {
    let plan = RunPlan::new(
        WordCloudConfig { output: Some(PathBuf::from("pfx")), ..WordCloudConfig::default() },
        vec![PathBuf::from("a.out"), PathBuf::from("dir/b.out")],
    )
    .unwrap();
    let images: Vec<PathBuf> = plan.targets.iter().map(|t| plan.image_path(t)).collect();
    assert_eq!(images, vec![PathBuf::from("pfx.a.out.png"), PathBuf::from("pfx.b.out.png")]);
}

#[test]
fn paths_with_spaces_keep_their_basename() {
    assert_eq!(
        image_path_for(Path::new("/tmp/my dir/odd name.so"), None, 1),
        PathBuf::from("odd name.so.png")
    );
}

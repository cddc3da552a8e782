//! Scripted demo run

use crate::demo::scene::Scene;
use crate::demo::screen::{
    Color, Image, MarkerBtnAdd, MarkerBtnChangeColor, MarkerBtnRemove, MarkerImgContainer,
    MarkerImgTest, Palette, ScreenController, register_palette, register_screen,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use scenedi_domain::{Error, Lifetime, Result};
use scenedi_infrastructure::{AppConfig, Container, EventBus};
use std::sync::Arc;
use tracing::info;

/// What a demo run did
#[derive(Debug, Clone, PartialEq)]
pub struct DemoSummary {
    /// Lifetime the palette was registered with
    pub palette_lifetime: Lifetime,
    /// Views spawned by the add button
    pub images_spawned: usize,
    /// Views removed by the remove button
    pub images_removed: usize,
    /// Views alive before teardown
    pub live_views: usize,
    /// Palette references held before teardown
    pub palette_refs: usize,
    /// Last color given to the test image
    pub test_image_color: Color,
    /// Whether the palette was evicted once the screen was gone
    pub palette_released: bool,
    /// Scene nodes left after teardown
    pub nodes_after_teardown: usize,
}

/// Build the demo screen, press its buttons and tear everything down
pub fn run_demo(config: &AppConfig) -> Result<DemoSummary> {
    let palette_lifetime = config.demo.palette_lifetime()?;
    let mut rng = match config.demo.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let bus = EventBus::new();
    let scene = Scene::new(&bus);

    let root = Container::builder(&bus)
        .name(config.container.root_name.clone())
        .build();
    register_palette(&root, &scene, palette_lifetime)?;

    let screen = Container::child_of(&root, config.container.screen_name.clone());
    register_screen(&screen, &scene)?;

    let screen_node = scene.create_node(None, "Screen")?;
    let img_test = scene.create_node(Some(screen_node), "ImgTest")?;
    scene.add_component(img_test, Arc::new(Image::new()))?;
    scene.add_component(img_test, Arc::new(MarkerImgTest))?;
    let buttons = scene.create_node(Some(screen_node), "Buttons")?;
    let btn_color = scene.create_node(Some(buttons), "BtnChangeColor")?;
    scene.add_component(btn_color, Arc::new(MarkerBtnChangeColor))?;
    let btn_add = scene.create_node(Some(buttons), "BtnAdd")?;
    scene.add_component(btn_add, Arc::new(MarkerBtnAdd))?;
    let btn_remove = scene.create_node(Some(buttons), "BtnRemove")?;
    scene.add_component(btn_remove, Arc::new(MarkerBtnRemove))?;
    let img_container = scene.create_node(Some(screen_node), "ImgContainer")?;
    scene.add_component(img_container, Arc::new(MarkerImgContainer))?;

    let controller = Arc::new(ScreenController::new(&scene));
    scene.add_behaviour(screen_node, Arc::clone(&controller))?;
    if !controller.is_wired() {
        return Err(Error::infrastructure(
            "screen controller was not fully injected",
        ));
    }

    for _ in 0..config.demo.image_count {
        controller.add_image()?;
    }
    let test_image_color = controller.change_color(&mut rng)?;

    let mut images_removed = 0;
    for _ in 0..config.demo.removals {
        if controller.remove_random_image(&mut rng)? {
            images_removed += 1;
        }
    }

    let live_views = controller.view_count();
    let palette_refs = root.ref_count::<Palette>().unwrap_or_default();
    info!(
        spawned = config.demo.image_count,
        removed = images_removed,
        live_views,
        palette_refs,
        "Screen exercised"
    );

    scene.destroy_node(screen_node);
    let palette_released = !root.is_cached::<Palette>();
    screen.destroy();
    root.destroy();

    let summary = DemoSummary {
        palette_lifetime,
        images_spawned: config.demo.image_count,
        images_removed,
        live_views,
        palette_refs,
        test_image_color,
        palette_released,
        nodes_after_teardown: scene.live_nodes(),
    };
    info!(
        palette_released = summary.palette_released,
        nodes_left = summary.nodes_after_teardown,
        "Demo finished"
    );
    Ok(summary)
}

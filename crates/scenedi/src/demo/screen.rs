//! Demo screen
//!
//! A screen with a test image, three buttons and an image container. The
//! screen's child container wires the [`ScreenController`] to its widgets and
//! tracks the spawned [`ViewImg`] instances through a filter; the root
//! container provides the shared [`Palette`].

use crate::demo::scene::{NodeId, Scene};
use rand::Rng;
use scenedi_domain::{
    ComponentLocator, EngineManaged, Error, FilterSlot, Injectable, Injected, Instance, Lifetime,
    ObjectRef, ObjectRefExt, Result, SlotTable,
};
use scenedi_infrastructure::Container;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};
use tracing::{debug, info};

/// RGB color with channels in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// A uniformly random color
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::rgb(rng.random(), rng.random(), rng.random())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({:.2}, {:.2}, {:.2})", self.r, self.g, self.b)
    }
}

/// Colored image component
#[derive(Debug)]
pub struct Image {
    color: RwLock<Color>,
}

impl Image {
    pub fn new() -> Self {
        Self {
            color: RwLock::new(Color::WHITE),
        }
    }

    pub fn color(&self) -> Color {
        *self.color.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_color(&self, color: Color) {
        *self.color.write().unwrap_or_else(PoisonError::into_inner) = color;
    }
}

impl Default for Image {
    fn default() -> Self {
        Self::new()
    }
}

/// Tags the image recolored by the change-color button
#[derive(Debug, Default)]
pub struct MarkerImgTest;

/// Tags the change-color button
#[derive(Debug, Default)]
pub struct MarkerBtnChangeColor;

/// Tags the add-image button
#[derive(Debug, Default)]
pub struct MarkerBtnAdd;

/// Tags the remove-image button
#[derive(Debug, Default)]
pub struct MarkerBtnRemove;

/// Tags the node spawned images are parented to
#[derive(Debug, Default)]
pub struct MarkerImgContainer;

const PALETTE_COLORS: [Color; 6] = [
    Color::rgb(0.91, 0.30, 0.24),
    Color::rgb(0.18, 0.80, 0.44),
    Color::rgb(0.20, 0.60, 0.86),
    Color::rgb(0.95, 0.77, 0.06),
    Color::rgb(0.61, 0.35, 0.71),
    Color::rgb(0.90, 0.49, 0.13),
];

/// Scene-owned color source handed out to every [`ViewImg`].
///
/// Lives on its own node; when the last view lets go of it the container
/// asks the scene to destroy it together with that node.
pub struct Palette {
    scene: Weak<Scene>,
    node: NodeId,
    cursor: AtomicUsize,
}

impl Palette {
    pub fn new(scene: &Arc<Scene>, node: NodeId) -> Self {
        Self {
            scene: Arc::downgrade(scene),
            node,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Node carrying the palette
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Colors cycle in a fixed order
    pub fn next_color(&self) -> Color {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        PALETTE_COLORS[index % PALETTE_COLORS.len()]
    }

    fn find_self(&self, scene: &Scene) -> Option<Instance> {
        let me: *const Palette = self;
        scene
            .component::<Palette>(self.node)
            .filter(|found| std::ptr::eq(Arc::as_ptr(found), me))
            .map(|found| found as Instance)
    }
}

impl EngineManaged for Palette {
    fn request_destroy(&self) {
        if let Some(scene) = self.scene.upgrade() {
            if let Some(me) = self.find_self(&scene) {
                scene.destroy_component(self.node, &me);
                debug!(node = %self.node, "Palette destroyed");
            }
        }
    }

    fn is_sole_component(&self) -> bool {
        self.scene
            .upgrade()
            .is_some_and(|scene| scene.component_count(self.node) == 1)
    }

    fn request_carrier_destroy(&self) {
        if let Some(scene) = self.scene.upgrade() {
            scene.destroy_node(self.node);
        }
    }
}

impl fmt::Debug for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Palette")
            .field("node", &self.node)
            .field("handed_out", &self.cursor.load(Ordering::Relaxed))
            .finish()
    }
}

/// Spawned image view, colored from the palette when enabled
#[derive(Debug, Default)]
pub struct ViewImg {
    image: Injected<Image>,
    palette: Injected<Palette>,
}

impl ViewImg {
    pub fn new() -> Self {
        Self::default()
    }

    /// Injected image, if any
    pub fn image(&self) -> Option<Arc<Image>> {
        self.image.get()
    }

    /// Injected palette, if any
    pub fn palette(&self) -> Option<Arc<Palette>> {
        self.palette.get()
    }

    /// Paint the image with the next palette color; returns whether both
    /// slots were available
    pub fn apply_palette(&self) -> bool {
        match (self.image.get(), self.palette.get()) {
            (Some(image), Some(palette)) => {
                image.set_color(palette.next_color());
                true
            }
            _ => false,
        }
    }
}

impl Injectable for ViewImg {
    fn slot_table() -> SlotTable<Self> {
        SlotTable::new()
            .dependency("image", |s: &Self| &s.image)
            .dependency("palette", |s: &Self| &s.palette)
    }
}

/// Drives the screen: recolors the test image, spawns and removes views
pub struct ScreenController {
    scene: Weak<Scene>,
    img: Injected<MarkerImgTest>,
    btn_change_color: Injected<MarkerBtnChangeColor>,
    btn_add: Injected<MarkerBtnAdd>,
    btn_remove: Injected<MarkerBtnRemove>,
    img_container: Injected<MarkerImgContainer>,
    views: FilterSlot<ViewImg>,
}

impl ScreenController {
    pub fn new(scene: &Arc<Scene>) -> Self {
        Self {
            scene: Arc::downgrade(scene),
            img: Injected::new(),
            btn_change_color: Injected::new(),
            btn_add: Injected::new(),
            btn_remove: Injected::new(),
            img_container: Injected::new(),
            views: FilterSlot::new(),
        }
    }

    /// Recolor the test image at random; returns the new color
    pub fn change_color<R: Rng>(&self, rng: &mut R) -> Result<Color> {
        require(&self.btn_change_color, "change-color button")?;
        let scene = self.scene()?;
        let marker = require(&self.img, "test image")?;
        let node = scene
            .node_of_component(&(marker as Instance))
            .ok_or_else(|| Error::not_found("test image node"))?;
        let image = scene
            .component::<Image>(node)
            .ok_or_else(|| Error::not_found("image on test image node"))?;
        let color = Color::random(rng);
        image.set_color(color);
        info!(color = %color, "Test image recolored");
        Ok(color)
    }

    /// Spawn a new view under the image container
    pub fn add_image(&self) -> Result<Arc<ViewImg>> {
        require(&self.btn_add, "add button")?;
        let scene = self.scene()?;
        let container = require(&self.img_container, "image container")?;
        let parent = scene
            .node_of_component(&(container as Instance))
            .ok_or_else(|| Error::not_found("image container node"))?;

        let node = scene.create_node(Some(parent), "ViewImg")?;
        scene.add_component(node, Arc::new(Image::new()))?;
        let view = Arc::new(ViewImg::new());
        scene.add_behaviour_with(node, Arc::clone(&view), |switch| {
            switch.with_on_enabled(|object: &ObjectRef| {
                if let Some(view) = object.downcast_arc::<ViewImg>() {
                    view.apply_palette();
                }
            })
        })?;
        debug!(node = %node, "Image view spawned");
        Ok(view)
    }

    /// Destroy a randomly picked live view; `false` when there is none
    pub fn remove_random_image<R: Rng>(&self, rng: &mut R) -> Result<bool> {
        require(&self.btn_remove, "remove button")?;
        let scene = self.scene()?;
        let views = require(&self.views, "view filter")?;
        if views.is_empty() {
            return Ok(false);
        }
        let index = rng.random_range(0..views.len());
        let Some(view) = views.get(index) else {
            return Ok(false);
        };
        let object: ObjectRef = view;
        let node = scene
            .node_of(&object)
            .ok_or_else(|| Error::not_found("node of image view"))?;
        scene.destroy_node(node);
        debug!(node = %node, "Image view removed");
        Ok(true)
    }

    /// Live views currently tracked by the filter
    pub fn view_count(&self) -> usize {
        self.views.get().map_or(0, |views| views.len())
    }

    /// Whether every widget slot was injected
    pub fn is_wired(&self) -> bool {
        self.img.is_set()
            && self.btn_change_color.is_set()
            && self.btn_add.is_set()
            && self.btn_remove.is_set()
            && self.img_container.is_set()
            && self.views.is_set()
    }

    fn scene(&self) -> Result<Arc<Scene>> {
        self.scene
            .upgrade()
            .ok_or_else(|| Error::not_found("scene of screen controller"))
    }
}

impl Injectable for ScreenController {
    fn slot_table() -> SlotTable<Self> {
        SlotTable::new()
            .dependency("img", |s: &Self| &s.img)
            .dependency("btn_change_color", |s: &Self| &s.btn_change_color)
            .dependency("btn_add", |s: &Self| &s.btn_add)
            .dependency("btn_remove", |s: &Self| &s.btn_remove)
            .dependency("img_container", |s: &Self| &s.img_container)
            .filter("views", |s: &Self| &s.views)
    }
}

impl fmt::Debug for ScreenController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenController")
            .field("wired", &self.is_wired())
            .field("views", &self.view_count())
            .finish()
    }
}

fn require<T: Send + Sync + 'static>(slot: &Injected<T>, what: &str) -> Result<Arc<T>> {
    slot.get()
        .ok_or_else(|| Error::not_found(format!("{what} (slot not injected)")))
}

/// Register the widget lookups of one screen.
///
/// Markers are searched below the requesting behaviour's node, the image is
/// taken from the requester's own node, and spawned views are tracked by a
/// `Filter<ViewImg>`.
pub fn register_screen(container: &Container, scene: &Arc<Scene>) -> Result<()> {
    register_marker::<MarkerBtnChangeColor>(container, scene)?;
    register_marker::<MarkerImgTest>(container, scene)?;
    register_marker::<MarkerBtnAdd>(container, scene)?;
    register_marker::<MarkerBtnRemove>(container, scene)?;
    register_marker::<MarkerImgContainer>(container, scene)?;

    let lookup = Arc::clone(scene);
    container.register_transient::<Image, _>(move |requester: Option<&ObjectRef>| {
        let node = lookup.node_of(requester?)?;
        lookup.component::<Image>(node)
    })?;

    container.register_filter::<ViewImg>()?;
    Ok(())
}

fn register_marker<M: Send + Sync + 'static>(
    container: &Container,
    scene: &Arc<Scene>,
) -> Result<()> {
    let lookup = Arc::clone(scene);
    container.register_transient::<M, _>(move |requester: Option<&ObjectRef>| {
        let node = lookup.node_of(requester?)?;
        lookup.try_locate::<M>(&node, None)
    })
}

/// Register the palette with the given lifetime.
///
/// A shared palette is created on first demand as a top-level scene object
/// and destroyed through the scene once no view references it.
pub fn register_palette(
    container: &Container,
    scene: &Arc<Scene>,
    lifetime: Lifetime,
) -> Result<()> {
    let owner = Arc::clone(scene);
    let create = move |_: Option<&ObjectRef>| {
        owner
            .create_scene_object(None, |node| Palette::new(&owner, node))
            .ok()
            .map(|(_, palette)| palette)
    };
    match lifetime {
        Lifetime::Shared => container.register_shared_managed::<Palette, _>(create),
        other => container.register::<Palette, _>(other, create).map(|_| ()),
    }
}

//! Pricing Catalog
//!
//! Static definitions of everything a client can book: core services,
//! add-ons, nail art levels and removals, plus the pure pricing helpers
//! used for the running total and the booking summary.
//!
//! Prices are whole pounds. Ids that no longer exist in the catalog
//! (e.g. stale ids rehydrated from an older draft) contribute nothing.

/// A bookable core service, add-on or removal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceOption {
    pub id: &'static str,
    pub name: &'static str,
    pub price: u32,
}

/// Tiered nail art option. At most one may be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtLevel {
    pub id: &'static str,
    pub name: &'static str,
    pub price: u32,
    pub level: u8,
    pub description: &'static str,
    pub example_images: &'static [&'static str],
}

/// Core services (required, multiple selection)
pub const CORE_SERVICES: &[ServiceOption] = &[
    ServiceOption { id: "gel-x", name: "Full Set Gel-X Extension", price: 50 },
    ServiceOption { id: "acrylic", name: "Full Set Acrylic", price: 45 },
    ServiceOption { id: "biab", name: "BIAB", price: 40 },
    ServiceOption { id: "gel-manicure", name: "Gel Manicure", price: 25 },
    ServiceOption { id: "gel-toes", name: "Gel on Toes", price: 25 },
];

/// Add-ons (optional, multiple selection)
pub const ADD_ONS: &[ServiceOption] = &[
    ServiceOption { id: "chrome", name: "Chrome", price: 10 },
    ServiceOption { id: "cat-eye", name: "Cat Eye", price: 10 },
    ServiceOption { id: "gems", name: "Gems", price: 5 },
    ServiceOption { id: "airbrush", name: "Airbrush (Aura / Ombre)", price: 15 },
];

/// Nail art levels (optional, single selection)
pub const ART_LEVELS: &[ArtLevel] = &[
    ArtLevel {
        id: "nail-art-1",
        name: "Level 1: Basic",
        price: 10,
        level: 1,
        description: "Simple lines, dots, or single accent nail.",
        example_images: &[
            "/level1/img1.webp",
            "/level1/img2.webp",
            "/level1/img3.webp",
        ],
    },
    ArtLevel {
        id: "nail-art-2",
        name: "Level 2: Advanced",
        price: 20,
        level: 2,
        description: "French tips, swirls, or simple patterns on all nails.",
        example_images: &[
            "/level2/img1.webp",
            "/level2/img2.webp",
            "/level2/img3.webp",
            "/level2/img4.webp",
        ],
    },
    ArtLevel {
        id: "nail-art-3",
        name: "Level 3: Intricate",
        price: 25,
        level: 3,
        description: "Complex hand-painted designs, chrome, or mixed media.",
        example_images: &[
            "/level3/img1.webp",
            "/level3/img2.webp",
            "/level3/img3.webp",
            "/level3/img4.webp",
        ],
    },
    ArtLevel {
        id: "nail-art-4",
        name: "Level 4: Extreme",
        price: 35,
        level: 4,
        description: "3D charms, heavy gems, or character art.",
        example_images: &[
            "/level4/img1.webp",
            "/level4/img2.webp",
            "/level4/img3.webp",
            "/level4/20251123_213705.webp",
            "/level4/20251123_213710.webp",
        ],
    },
];

/// Removals (optional, multiple selection, opt-in)
pub const REMOVALS: &[ServiceOption] = &[
    ServiceOption { id: "gel-biab-removal", name: "Gel / BIAB Removal", price: 10 },
    ServiceOption { id: "acrylic-removal", name: "Acrylic Removal", price: 15 },
    ServiceOption { id: "gel-x-removal", name: "Gel-X Removal", price: 10 },
];

/// Catalog section an item belongs to, in summary display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    CoreService,
    AddOn,
    ArtLevel,
    Removal,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Self::CoreService => "core service",
            Self::AddOn => "add-on",
            Self::ArtLevel => "art level",
            Self::Removal => "removal",
        }
    }

    /// Options for the multi-select categories
    pub fn options(&self) -> &'static [ServiceOption] {
        match self {
            Self::CoreService => CORE_SERVICES,
            Self::AddOn => ADD_ONS,
            Self::Removal => REMOVALS,
            Self::ArtLevel => &[],
        }
    }
}

/// One row of the booking summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub category: Category,
    pub name: &'static str,
    pub price: u32,
}

pub fn find_core_service(id: &str) -> Option<&'static ServiceOption> {
    CORE_SERVICES.iter().find(|s| s.id == id)
}

pub fn find_add_on(id: &str) -> Option<&'static ServiceOption> {
    ADD_ONS.iter().find(|s| s.id == id)
}

pub fn find_removal(id: &str) -> Option<&'static ServiceOption> {
    REMOVALS.iter().find(|s| s.id == id)
}

pub fn find_art_level(id: &str) -> Option<&'static ArtLevel> {
    ART_LEVELS.iter().find(|l| l.id == id)
}

/// Look up an option of a multi-select category by id
pub fn find_option(category: Category, id: &str) -> Option<&'static ServiceOption> {
    category.options().iter().find(|s| s.id == id)
}

/// Selected items in fixed display order: core services, add-ons,
/// art level, removals. Unknown ids are skipped.
pub fn list_selected_items<S: AsRef<str>>(
    core_ids: &[S],
    add_on_ids: &[S],
    removal_ids: &[S],
    art_level_id: Option<&str>,
) -> Vec<LineItem> {
    let options = |category: Category, ids: &[S]| -> Vec<LineItem> {
        ids.iter()
            .filter_map(|id| find_option(category, id.as_ref()))
            .map(|s| LineItem {
                category,
                name: s.name,
                price: s.price,
            })
            .collect()
    };

    let mut items = options(Category::CoreService, core_ids);
    items.extend(options(Category::AddOn, add_on_ids));
    if let Some(level) = art_level_id.and_then(find_art_level) {
        items.push(LineItem {
            category: Category::ArtLevel,
            name: level.name,
            price: level.price,
        });
    }
    items.extend(options(Category::Removal, removal_ids));
    items
}

/// Sum of the catalog prices of every selected item
pub fn compute_total<S: AsRef<str>>(
    core_ids: &[S],
    add_on_ids: &[S],
    removal_ids: &[S],
    art_level_id: Option<&str>,
) -> u32 {
    list_selected_items(core_ids, add_on_ids, removal_ids, art_level_id)
        .iter()
        .map(|item| item.price)
        .sum()
}

mod common;

use agency_pdf::pdf::PdfDocument;
use agency_pdf::proposal::cover::{BAND_TOP, DATE_REGION_TOP, cover_placement, plan_client_block};
use agency_pdf::proposal::overview::{SectionKind, plan_sections};
use agency_pdf::proposal::pricing::{DEFAULT_NOTES, commercial_notes, pricing_table, totals_rows};
use agency_pdf::proposal::{HEADER_LOGO_BOX, ProposalContext};
use agency_pdf::theme::{PAGE_HEIGHT, PAGE_WIDTH};
use agency_pdf::{
    AssetSource, AssetSources, Config, FontConfig, ProposalAssets, SoftwareRasterizer, generate_offer_proposal_pdf,
    render_offer_proposal,
};

#[test]
fn full_proposal_renders_cover_overview_and_pricing() {
    let _ = env_logger::try_init();
    let input = common::sample_proposal();
    let bytes = render_offer_proposal(&input, &ProposalAssets::default(), &Config::default()).unwrap();
    common::assert_pdf(&bytes);
    assert!(common::page_count(&bytes) >= 3);
}

#[test]
fn zero_total_with_no_products_still_renders() {
    let input = common::proposal(r#"{"clientName": "Solo", "pageTitle": "Consulting", "totalPrice": 0, "products": []}"#);
    let config = Config::default();

    let table = pricing_table(&input, &config.brand.currency_symbol);
    assert_eq!(table.columns.len(), 4);
    assert!(table.rows.is_empty());
    let totals = totals_rows(&input, &config.brand.currency_symbol);
    assert_eq!(totals[2].1, "\u{20ac}0.00");

    let bytes = render_offer_proposal(&input, &ProposalAssets::default(), &config).unwrap();
    common::assert_pdf(&bytes);
    assert_eq!(common::page_count(&bytes), 3);
}

#[test]
fn empty_optional_sections_are_omitted() {
    let input = common::proposal(
        r#"{"clientName": "Acme", "pageTitle": "Site", "description": "A new marketing site.",
            "whatWeNeed": "", "roadmap": null,
            "products": [{"name": "Build", "price": 4000, "timeline": "3 weeks", "techStack": "Astro, Tailwind"}],
            "totalPrice": 4000}"#,
    );
    let kinds = plan_sections(&input, 30).kinds();
    for present in [SectionKind::ProjectSummary, SectionKind::TechStack, SectionKind::NextSteps] {
        assert!(kinds.contains(&present), "missing {present:?}");
    }
    for absent in [SectionKind::WhatWeNeed, SectionKind::Roadmap] {
        assert!(!kinds.contains(&absent), "unexpected {absent:?}");
    }

    let notes = commercial_notes(input.why_to_invest.as_deref());
    assert_eq!(notes, DEFAULT_NOTES.map(String::from).to_vec());

    let bytes = render_offer_proposal(&input, &ProposalAssets::default(), &Config::default()).unwrap();
    common::assert_pdf(&bytes);
}

#[test]
fn long_client_name_uses_reduced_size_inside_band() {
    let doc = PdfDocument::new(&FontConfig::builtin(), PAGE_WIDTH, PAGE_HEIGHT).unwrap();

    let short = plan_client_block(&doc, "Acme");
    assert!(!short.reduced());
    assert_eq!(short.lines.len(), 1);

    let long = plan_client_block(&doc, "The International Association of Independent Coffee Roasters and Baristas");
    assert!(long.reduced(), "font size stayed at {}", long.font_size);
    assert!(long.lines.len() >= 2);
    assert!(long.top > BAND_TOP);
    assert!(long.bottom <= DATE_REGION_TOP, "block ends at {} past {}", long.bottom, DATE_REGION_TOP);

    let absurd = plan_client_block(&doc, &"Verylongname Company ".repeat(20));
    assert!(absurd.lines.len() <= 3);
    assert!(absurd.bottom <= DATE_REGION_TOP);
}

#[test]
fn many_line_items_flow_onto_extra_pages() {
    let _ = env_logger::try_init();
    let products: Vec<String> = (1..=60)
        .map(|i| format!(r#"{{"name": "Deliverable {i}", "price": 100, "timeline": "{i} days", "techStack": "Rust"}}"#))
        .collect();
    let input = common::proposal(&format!(
        r#"{{"clientName": "Big Co", "pageTitle": "Platform", "totalPrice": 6000, "products": [{}]}}"#,
        products.join(",")
    ));
    let bytes = render_offer_proposal(&input, &ProposalAssets::default(), &Config::default()).unwrap();
    assert!(common::page_count(&bytes) > 3);
}

#[test]
fn logo_assets_are_rasterized_to_their_boxes() {
    let sources = AssetSources {
        logo: Some(AssetSource::Bytes(common::svg_logo(1264.17, 217.92))),
        background: None,
    };
    let assets = ProposalAssets::load(&sources, &SoftwareRasterizer).unwrap();
    let header = assets.header_logo.as_ref().expect("header logo");
    assert!(header.width() <= HEADER_LOGO_BOX.0 && header.height() <= HEADER_LOGO_BOX.1);
    assert!(assets.cover_logo.is_some());
    assert!(assets.background.is_none());

    let bytes = render_offer_proposal(&common::sample_proposal(), &assets, &Config::default()).unwrap();
    common::assert_pdf(&bytes);
}

#[test]
fn broken_assets_fall_back_and_file_is_saved() {
    let _ = env_logger::try_init();
    let out = common::output_dir("proposal_broken_assets");
    let sources = AssetSources {
        logo: Some(AssetSource::Bytes(b"<svg oops".to_vec())),
        background: Some(AssetSource::Reference("tests/fixtures/missing-background.png".into())),
    };
    let assets = ProposalAssets::load(&sources, &SoftwareRasterizer).unwrap();
    assert!(assets.cover_logo.is_none() && assets.header_logo.is_none() && assets.background.is_none());

    let input = common::sample_proposal();
    let path = generate_offer_proposal_pdf(&input, &sources, &Config::default(), &out).unwrap();
    assert_eq!(path.file_name().unwrap(), "proposal_Acme_Co_LLC.pdf");
    let bytes = std::fs::read(&path).unwrap();
    common::assert_pdf(&bytes);

    let leftovers: Vec<_> = std::fs::read_dir(&out)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "part"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn context_defaults_identifier_from_client_and_date() {
    let input = common::sample_proposal();
    let config = Config::default();
    let ctx = ProposalContext::new(&input, &config.brand);
    assert!(ctx.proposal_id.starts_with("ZP-20261017-"));
    assert_eq!(ctx.client_name, "Acme & Co. LLC");
}

#[test]
fn background_covers_the_page_without_stretching() {
    let page_aspect = PAGE_WIDTH / PAGE_HEIGHT;
    for aspect in [16.0 / 9.0, 1.0, page_aspect, 0.4] {
        let (x, y, w, h) = cover_placement(aspect, PAGE_WIDTH, PAGE_HEIGHT);
        assert!((w / h - aspect).abs() < 1e-3, "aspect {aspect} drawn as {}", w / h);
        assert!(x <= 0.0 && y <= 0.0);
        assert!(x + w >= PAGE_WIDTH - 1e-3 && y + h >= PAGE_HEIGHT - 1e-3);
        assert!((x + w / 2.0 - PAGE_WIDTH / 2.0).abs() < 1e-3);
        assert!((y + h / 2.0 - PAGE_HEIGHT / 2.0).abs() < 1e-3);
    }

    let wide = ProposalAssets::load(
        &AssetSources {
            logo: None,
            background: Some(AssetSource::Bytes(common::png_bytes(320, 90))),
        },
        &SoftwareRasterizer,
    )
    .unwrap();
    assert!(wide.background.is_some());
    let bytes = render_offer_proposal(&common::sample_proposal(), &wide, &Config::default()).unwrap();
    common::assert_pdf(&bytes);
}

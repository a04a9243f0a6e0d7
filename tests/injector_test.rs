use anyhow::Result;
use folio_press::core::injector::BindingOutcome;
use folio_press::domain::model::{Education, Project, Skill, SocialLinks};
use folio_press::{FolioError, PortfolioRecord, TemplateDocument, TemplateInjector};
use kuchikiki::traits::*;

const STANDARD_PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>Portfolio</title></head>
<body>
<h1 id="portfolio-name">Your Name</h1>
<p id="portfolio-title">Your Title</p>
<img id="portfolio-hero-image" src="https://images.example.com/stock.png">
<a id="social-github" href="https://github.com/template">GitHub</a>
<a id="social-twitter" href="https://x.com/template">Twitter</a>
<a id="social-email" href="mailto:template@example.com">Email</a>
<h2 id="portfolio-projects-header">Projects</h2>
<div id="portfolio-projects"><article>Sample project</article></div>
<h2 id="portfolio-education-header">Education</h2>
<div id="portfolio-education"><div>Sample school</div></div>
<h2 id="portfolio-skills-header">Skills</h2>
<div id="portfolio-skills"><span>Sample</span></div>
</body></html>"#;

fn render(record: &PortfolioRecord, markup: &str) -> Result<String> {
    let template = TemplateDocument::new("template02", markup);
    Ok(TemplateInjector::new().render(record, &template)?.into_string())
}

fn jane() -> PortfolioRecord {
    PortfolioRecord {
        full_name: Some("Jane Doe".to_string()),
        skills: vec![Skill::Name("Go".to_string()), Skill::Name("Rust".to_string())],
        ..Default::default()
    }
}

/// 基本情境：姓名與技能，其他欄位皆缺
#[test]
fn test_name_and_skills_scenario() -> Result<()> {
    let html = render(&jane(), STANDARD_PAGE)?;

    assert!(html.contains(r#"<h1 id="portfolio-name">Jane Doe</h1>"#));
    assert!(html.contains("<title>Jane Doe | Portfolio</title>"));

    let go = html.find(">Go<").expect("Go rendered");
    let rust = html.find(">Rust<").expect("Rust rendered");
    assert!(go < rust);
    assert!(!html.contains("Sample</span>"));

    // 沒有專案與學歷：標題與容器都移除
    assert!(!html.contains("portfolio-projects"));
    assert!(!html.contains("portfolio-education"));
    assert!(!html.contains("Sample project"));
    assert!(html.contains(r#"<h2 id="portfolio-skills-header">Skills</h2>"#));
    Ok(())
}

#[test]
fn test_render_is_idempotent() -> Result<()> {
    let record = jane();
    let first = render(&record, STANDARD_PAGE)?;
    let second = render(&record, STANDARD_PAGE)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_missing_scalar_field_is_hidden() -> Result<()> {
    let html = render(&jane(), STANDARD_PAGE)?;
    assert!(html.contains(r#"<p id="portfolio-title" style="display: none">Your Title</p>"#));
    Ok(())
}

#[test]
fn test_missing_photo_gets_placeholder() -> Result<()> {
    let html = render(&jane(), STANDARD_PAGE)?;
    assert!(html.contains(r#"src="data:image/svg+xml;utf8,"#));
    assert!(html.contains(r#"alt="Jane Doe""#));
    assert!(!html.contains("stock.png"));
    Ok(())
}

#[test]
fn test_empty_social_links_hide_anchors() -> Result<()> {
    let record = PortfolioRecord {
        social_links: SocialLinks::default(),
        ..jane()
    };
    let html = render(&record, STANDARD_PAGE)?;

    assert!(!html.contains("github.com/template"));
    assert!(!html.contains("x.com/template"));
    assert!(!html.contains("template@example.com"));
    assert!(html.contains(r#"id="social-github""#));
    assert!(html.matches("display: none").count() >= 3);
    Ok(())
}

#[test]
fn test_link_normalization() -> Result<()> {
    let record = PortfolioRecord {
        social_links: SocialLinks {
            github: Some("github.com/alex".to_string()),
            twitter: Some("https://x.com/alex".to_string()),
            email: Some("a@b.com".to_string()),
            ..Default::default()
        },
        ..jane()
    };
    let html = render(&record, STANDARD_PAGE)?;

    assert!(html.contains(r#"href="https://github.com/alex""#));
    assert!(html.contains(r#"href="https://x.com/alex""#));
    assert!(html.contains(r#"href="mailto:a@b.com""#));
    Ok(())
}

#[test]
fn test_current_flag_overrides_end_date() -> Result<()> {
    let record = PortfolioRecord {
        education: vec![Education {
            institution: Some("Zest Academy".to_string()),
            start_date: Some("2022".to_string()),
            end_date: Some("2026".to_string()),
            current: true,
            ..Default::default()
        }],
        ..jane()
    };
    let html = render(&record, STANDARD_PAGE)?;

    assert!(html.contains("Zest Academy"));
    assert!(html.contains("2022 — Present"));
    assert!(!html.contains("2026"));
    Ok(())
}

#[test]
fn test_items_keep_record_order_and_duplicates() -> Result<()> {
    let record = PortfolioRecord {
        skills: vec![
            Skill::Name("Rust".to_string()),
            Skill::Named {
                name: "Go".to_string(),
            },
            Skill::Name("Rust".to_string()),
        ],
        ..Default::default()
    };
    let html = render(&record, STANDARD_PAGE)?;

    let rendered: Vec<&str> = html
        .match_indices(r#"data-bind="name">"#)
        .map(|(i, pattern)| {
            let rest = &html[i + pattern.len()..];
            &rest[..rest.find('<').unwrap_or(0)]
        })
        .collect();
    assert_eq!(rendered, vec!["Rust", "Go", "Rust"]);
    Ok(())
}

#[test]
fn test_selector_fallback_to_class() -> Result<()> {
    let record = PortfolioRecord {
        about_me: Some("Hello there".to_string()),
        ..Default::default()
    };
    let template = TemplateDocument::new(
        "template03",
        r#"<html><body><p class="lead portfolio-bio">Lorem ipsum</p></body></html>"#,
    );
    let (markup, report) = TemplateInjector::new().render_with_report(&record, &template)?;

    assert!(markup
        .as_str()
        .contains(r#"<p class="lead portfolio-bio">Hello there</p>"#));
    assert_eq!(
        report.outcome("aboutMe"),
        Some(&BindingOutcome::Bound {
            strategy: 1,
            elements: 1
        })
    );
    Ok(())
}

#[test]
fn test_template_element_is_item_prototype() -> Result<()> {
    let record = PortfolioRecord {
        projects: vec![
            Project {
                title: Some("Nebula".to_string()),
                link: Some("nebula.dev".to_string()),
                technologies: vec!["Rust".to_string(), "Redis".to_string()],
                ..Default::default()
            },
            Project {
                title: Some("Comet".to_string()),
                ..Default::default()
            },
        ],
        ..Default::default()
    };
    let markup = r#"<html><body>
<div data-loop="projects"><template><section class="card"><h3 data-bind="title"></h3><div data-bind-array="technologies" data-tag-class="badge"></div><a data-bind-link="link">Live</a></section></template><section>Sample</section></div>
</body></html>"#;
    let html = render(&record, markup)?;

    assert_eq!(html.matches(r#"<section class="card">"#).count(), 2);
    assert!(html.contains(r#"<span class="badge">Rust</span><span class="badge">Redis</span>"#));
    assert!(html.contains(r#"href="https://nebula.dev""#));
    assert!(!html.contains("Sample"));
    assert!(!html.contains("<template>"));
    assert!(html.find("Nebula") < html.find("Comet"));
    Ok(())
}

#[test]
fn test_show_if_conditionals() -> Result<()> {
    let markup = r#"<html><body>
<section id="about" data-show-if="aboutMe"><p>About</p></section>
<section id="work" data-show-if="skills" style="display: none"><p>Skills</p></section>
</body></html>"#;
    let html = render(&jane(), markup)?;

    assert!(html.contains(r#"<section id="about" data-show-if="aboutMe" style="display: none">"#));
    assert!(html.contains(r#"<section id="work" data-show-if="skills">"#));
    Ok(())
}

#[test]
fn test_record_keys_in_binding_attributes() -> Result<()> {
    let page = r##"<html><body>
<img id="photo" data-bind-img="profilePhotoUrl" src="stock.png">
<div id="gh" data-show-if="socialLinks.github">GitHub</div>
<div id="tw" data-show-if="socialLinks.twitter">Twitter</div>
<div id="has-photo" data-show-if="profilePhotoUrl">Photo</div>
<a id="resume" data-bind="resumeUrl" href="#">Resume placeholder</a>
<span id="phone" data-bind="phone">555-0100</span>
<span id="custom" data-bind="favouriteColour">Blue</span>
</body></html>"##;
    let record = PortfolioRecord {
        full_name: Some("Jane Doe".to_string()),
        profile_photo_url: Some("https://cdn.example.com/jane.png".to_string()),
        resume_url: Some("jane.dev/resume.pdf".to_string()),
        social_links: SocialLinks {
            github: Some("github.com/jane".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };

    let template = TemplateDocument::new("template02", page);
    let (markup, report) = TemplateInjector::new().render_with_report(&record, &template)?;
    let html = markup.as_str();

    assert!(html.contains(r#"src="https://cdn.example.com/jane.png""#));
    assert!(!html.contains("stock.png"));
    assert!(html.contains(r#"alt="Jane Doe""#));
    assert!(html.contains(r#"<div id="gh" data-show-if="socialLinks.github">GitHub</div>"#));
    assert!(html.contains(r#"<div id="has-photo" data-show-if="profilePhotoUrl">Photo</div>"#));
    assert!(html.contains(r#"data-show-if="socialLinks.twitter" style="display: none""#));
    assert!(html.contains(r#"href="https://jane.dev/resume.pdf""#));
    assert!(!html.contains("Resume placeholder"));
    assert!(html.contains(r#"<span id="phone" data-bind="phone" style="display: none">"#));
    assert!(html.contains(r#"<span id="custom" data-bind="favouriteColour">Blue</span>"#));

    assert!(matches!(
        report.outcome("data-bind=resumeUrl"),
        Some(BindingOutcome::Bound { .. })
    ));
    assert_eq!(
        report.outcome("data-bind=favouriteColour"),
        Some(&BindingOutcome::Skipped)
    );
    Ok(())
}

#[test]
fn test_template_without_insertion_points() -> Result<()> {
    let template = TemplateDocument::new("template04", "<html><body><p>Static</p></body></html>");
    let (markup, report) = TemplateInjector::new().render_with_report(&jane(), &template)?;

    assert!(markup.as_str().contains("<p>Static</p>"));
    assert!(!report.bindings.is_empty());
    assert_eq!(report.skipped().count(), report.bindings.len());
    Ok(())
}

#[test]
fn test_unparseable_template_is_an_error() {
    let template = TemplateDocument::new("template05", "   \n  ");
    let result = TemplateInjector::new().render(&jane(), &template);
    assert!(matches!(result, Err(FolioError::TemplateParse { .. })));
}

#[test]
fn test_text_is_escaped() -> Result<()> {
    let record = PortfolioRecord {
        full_name: Some("<script>alert(1)</script>".to_string()),
        ..Default::default()
    };
    let html = render(&record, STANDARD_PAGE)?;
    assert!(html.contains(
        r#"<h1 id="portfolio-name">&lt;script&gt;alert(1)&lt;/script&gt;</h1>"#
    ));

    // 屬性值內的 `<` 不會被解析成元素
    let reparsed = kuchikiki::parse_html().one(html.as_str());
    assert_eq!(reparsed.select("script").map(|s| s.count()).unwrap_or(0), 0);
    let hero = reparsed
        .select_first("#portfolio-hero-image")
        .map_err(|_| anyhow::anyhow!("hero image missing"))?;
    assert_eq!(
        hero.attributes.borrow().get("alt"),
        Some("<script>alert(1)</script>")
    );
    Ok(())
}

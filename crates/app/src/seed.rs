use academy_core::model::{
    Audience, Identity, LessonDraft, LessonKind, ModuleDraft, RegistrationDraft,
};
use anyhow::{Context, bail};
use services::{AppServices, AuthServiceError};
use tracing::info;

struct SeedModule {
    title: &'static str,
    slug: &'static str,
    description: &'static str,
    category: &'static str,
    duration: &'static str,
    lessons: &'static [SeedLesson],
}

struct SeedLesson {
    title: &'static str,
    slug: &'static str,
    description: &'static str,
    kind: &'static str,
    duration: &'static str,
    video_url: Option<&'static str>,
    pdf_url: Option<&'static str>,
    content: Option<&'static str>,
}

const BLOCKCHAIN_VIDEO: &str = "https://www.youtube.com/embed/SSo_EIwHSd4";
const CONTRACTS_VIDEO: &str = "https://www.youtube.com/embed/ZE2HxTmxfrI";

const CATALOG: &[SeedModule] = &[
    SeedModule {
        title: "Introduction to Blockchain",
        slug: "introduction-to-blockchain",
        description: "Learn the fundamentals of blockchain technology, how blocks are linked and where distributed ledgers are used.",
        category: "Beginner",
        duration: "1 hour",
        lessons: &[
            SeedLesson {
                title: "What is Blockchain?",
                slug: "what-is-blockchain",
                description: "Learn the fundamental concepts of blockchain technology and how it works.",
                kind: "video",
                duration: "12:30",
                video_url: Some(BLOCKCHAIN_VIDEO),
                pdf_url: None,
                content: None,
            },
            SeedLesson {
                title: "History of Blockchain & Bitcoin",
                slug: "history-of-blockchain-bitcoin",
                description: "Explore the origins of blockchain technology and the creation of Bitcoin.",
                kind: "video",
                duration: "15:45",
                video_url: Some("https://www.youtube.com/embed/qOVAbKKSH10"),
                pdf_url: None,
                content: None,
            },
            SeedLesson {
                title: "How Blockchain Works",
                slug: "how-blockchain-works",
                description: "Deep dive into the technical mechanics of how blockchain operates.",
                kind: "video",
                duration: "18:20",
                video_url: Some(BLOCKCHAIN_VIDEO),
                pdf_url: None,
                content: None,
            },
            SeedLesson {
                title: "Blockchain Use Cases",
                slug: "blockchain-use-cases",
                description: "Discover real-world applications of blockchain beyond cryptocurrency.",
                kind: "video",
                duration: "14:10",
                video_url: Some(BLOCKCHAIN_VIDEO),
                pdf_url: None,
                content: None,
            },
        ],
    },
    SeedModule {
        title: "Smart Contracts Deep Dive",
        slug: "smart-contracts-deep-dive",
        description: "Understand how smart contracts execute on the EVM and write and secure your first contract.",
        category: "Intermediate",
        duration: "1.5 hours",
        lessons: &[
            SeedLesson {
                title: "Introduction to Smart Contracts",
                slug: "introduction-to-smart-contracts",
                description: "Understand what smart contracts are and how they revolutionize agreements.",
                kind: "video",
                duration: "16:30",
                video_url: Some(CONTRACTS_VIDEO),
                pdf_url: None,
                content: None,
            },
            SeedLesson {
                title: "Ethereum Virtual Machine (EVM)",
                slug: "ethereum-virtual-machine",
                description: "Learn about the Ethereum Virtual Machine and how it executes smart contracts.",
                kind: "video",
                duration: "22:15",
                video_url: Some(CONTRACTS_VIDEO),
                pdf_url: None,
                content: None,
            },
            SeedLesson {
                title: "Writing Your First Smart Contract",
                slug: "writing-first-smart-contract",
                description: "Hands-on tutorial for creating a basic smart contract in Solidity.",
                kind: "interactive",
                duration: "35:40",
                video_url: None,
                pdf_url: None,
                content: Some("Interactive coding environment will be available here."),
            },
            SeedLesson {
                title: "Smart Contract Security",
                slug: "smart-contract-security",
                description: "Critical security considerations when developing smart contracts.",
                kind: "video",
                duration: "28:50",
                video_url: Some(CONTRACTS_VIDEO),
                pdf_url: None,
                content: None,
            },
        ],
    },
    SeedModule {
        title: "DeFi Protocol Analysis",
        slug: "defi-protocol-analysis",
        description: "Analyse decentralized finance protocols: automated market makers, lending platforms and their risks.",
        category: "Advanced",
        duration: "1.5 hours",
        lessons: &[
            SeedLesson {
                title: "Introduction to DeFi",
                slug: "introduction-to-defi",
                description: "Overview of Decentralized Finance and its core principles.",
                kind: "pdf",
                duration: "25:00",
                video_url: None,
                pdf_url: Some("https://example.com/defi-introduction.pdf"),
                content: None,
            },
            SeedLesson {
                title: "Automated Market Makers (AMM)",
                slug: "automated-market-makers",
                description: "Deep analysis of AMM protocols like Uniswap and Curve.",
                kind: "pdf",
                duration: "30:00",
                video_url: None,
                pdf_url: Some("https://example.com/amm-analysis.pdf"),
                content: None,
            },
            SeedLesson {
                title: "Lending Protocols",
                slug: "lending-protocols",
                description: "Study of lending platforms like Aave and Compound.",
                kind: "pdf",
                duration: "28:00",
                video_url: None,
                pdf_url: Some("https://example.com/lending-protocols.pdf"),
                content: None,
            },
        ],
    },
];

/// What a seed run changed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub admin_created: bool,
    pub modules_created: usize,
    pub lessons_created: usize,
}

/// Ensure the administrator exists, then load every catalog module whose
/// slug is not present yet. Running it twice is harmless.
pub async fn run(
    services: &AppServices,
    admin_name: &str,
    admin_email: &str,
    admin_password: &str,
) -> anyhow::Result<SeedReport> {
    let mut report = SeedReport::default();
    let admin =
        ensure_admin(services, admin_name, admin_email, admin_password, &mut report).await?;
    let catalog = services.catalog();

    let existing: Vec<String> = catalog
        .list_modules(Audience::Admin)
        .await
        .context("list existing modules")?
        .iter()
        .map(|module| module.slug().to_owned())
        .collect();

    for seed in CATALOG {
        if existing.iter().any(|slug| slug == seed.slug) {
            info!(slug = seed.slug, "module already present, skipping");
            continue;
        }
        let module = catalog
            .create_module(
                admin,
                ModuleDraft {
                    title: seed.title.to_owned(),
                    slug: seed.slug.to_owned(),
                    description: seed.description.to_owned(),
                    category: seed.category.to_owned(),
                    duration: Some(seed.duration.to_owned()),
                    thumbnail: None,
                    is_published: true,
                },
            )
            .await
            .with_context(|| format!("create module {}", seed.slug))?;
        report.modules_created += 1;

        for (order, lesson) in (1_i64..).zip(seed.lessons) {
            catalog
                .create_lesson(
                    admin,
                    LessonDraft {
                        module_id: module.id(),
                        title: lesson.title.to_owned(),
                        slug: lesson.slug.to_owned(),
                        description: Some(lesson.description.to_owned()),
                        kind: LessonKind::parse(lesson.kind),
                        order,
                        duration: Some(lesson.duration.to_owned()),
                        video_url: lesson.video_url.map(str::to_owned),
                        document_url: lesson.pdf_url.map(str::to_owned),
                        content: lesson.content.map(str::to_owned),
                        is_published: true,
                        is_free: order == 1,
                    },
                )
                .await
                .with_context(|| format!("create lesson {}", lesson.slug))?;
            report.lessons_created += 1;
        }
        info!(slug = seed.slug, lessons = seed.lessons.len(), "module seeded");
    }

    Ok(report)
}

async fn ensure_admin(
    services: &AppServices,
    name: &str,
    email: &str,
    password: &str,
    report: &mut SeedReport,
) -> anyhow::Result<Identity> {
    let auth = services.auth();
    match auth
        .create_admin(RegistrationDraft {
            name: name.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
            password_confirmation: password.to_owned(),
        })
        .await
    {
        Ok(user) => {
            report.admin_created = true;
            info!(email, "administrator created");
            return Ok(user.identity());
        }
        Err(AuthServiceError::EmailTaken) => {}
        Err(err) => return Err(err).context("create administrator"),
    }

    let issued = auth
        .login(email, password)
        .await
        .context("existing administrator rejected the given password")?;
    auth.logout(&issued.token)
        .await
        .context("revoke seed session token")?;
    if !issued.user.is_admin() {
        bail!("{email} exists but is not an administrator");
    }
    Ok(issued.user.identity())
}

#[cfg(test)]
mod tests {
    use super::*;

    use academy_core::time::fixed_now;
    use services::Clock;
    use storage::repository::Storage;

    fn services() -> AppServices {
        AppServices::from_storage(&Storage::in_memory(), Clock::fixed(fixed_now()))
    }

    #[tokio::test]
    async fn seed_loads_catalog_once() {
        let services = services();
        let first = run(&services, "Admin", "admin@example.com", "password123")
            .await
            .unwrap();
        assert_eq!(
            first,
            SeedReport {
                admin_created: true,
                modules_created: 3,
                lessons_created: 11,
            }
        );

        let second = run(&services, "Admin", "admin@example.com", "password123")
            .await
            .unwrap();
        assert_eq!(second, SeedReport::default());

        let modules = services
            .catalog()
            .list_modules(Audience::Public)
            .await
            .unwrap();
        assert_eq!(modules.len(), 3);
    }

    #[tokio::test]
    async fn seeded_kinds_include_interactive_and_pdf() {
        let services = services();
        run(&services, "Admin", "admin@example.com", "password123")
            .await
            .unwrap();
        let catalog = services.catalog();
        let mut kinds = Vec::new();
        for module in catalog.list_modules(Audience::Public).await.unwrap() {
            for lesson in catalog
                .list_lessons(Audience::Public, module.id())
                .await
                .unwrap()
            {
                kinds.push(lesson.kind().clone());
            }
        }
        assert!(kinds.contains(&LessonKind::Interactive));
        assert_eq!(kinds.iter().filter(|k| **k == LessonKind::Pdf).count(), 3);
    }

    #[tokio::test]
    async fn wrong_password_for_existing_admin_fails() {
        let services = services();
        run(&services, "Admin", "admin@example.com", "password123")
            .await
            .unwrap();
        let err = run(&services, "Admin", "admin@example.com", "password999")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("rejected"));
    }
}

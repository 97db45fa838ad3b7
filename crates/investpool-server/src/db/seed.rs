// Demo dataset loaded into a fresh database.

use sqlx::SqlitePool;

use super::models::{
    parse_date, Document, InvestmentDetail, InvestmentStatus, InvestmentType, Investor,
    InvestorStatus, Milestone, RiskLevel, TeamMember, Votes,
};
use super::{insert_investment, insert_investment_detail, insert_investor, models::Investment};
use crate::error::Result;

const IMAGE_BASE: &str = "https://images.unsplash.com";

struct SeedInvestment {
    id: &'static str,
    title: &'static str,
    investment_type: InvestmentType,
    amount: i64,
    profit: Option<(i64, f64)>,
    status: InvestmentStatus,
    start: &'static str,
    end: Option<&'static str>,
    votes: Option<(u32, u32)>,
    image: &'static str,
}

const INVESTMENTS: &[SeedInvestment] = &[
    SeedInvestment {
        id: "1",
        title: "Luxury Cabernet Collection",
        investment_type: InvestmentType::Wine,
        amount: 12_500,
        profit: Some((2_300, 18.4)),
        status: InvestmentStatus::Active,
        start: "2023-06-15",
        end: Some("2024-12-15"),
        votes: None,
        image: "photo-1553361371-9b22f78e8b1d",
    },
    SeedInvestment {
        id: "2",
        title: "Downtown Apartment",
        investment_type: InvestmentType::RealEstate,
        amount: 250_000,
        profit: Some((12_000, 4.8)),
        status: InvestmentStatus::Active,
        start: "2022-03-10",
        end: None,
        votes: None,
        image: "photo-1560448204-e02f11c3d0e2",
    },
    SeedInvestment {
        id: "3",
        title: "Premium Electric Vehicle Fleet",
        investment_type: InvestmentType::Cars,
        amount: 180_000,
        profit: Some((-8_500, -4.7)),
        status: InvestmentStatus::Active,
        start: "2023-01-20",
        end: Some("2024-07-20"),
        votes: None,
        image: "photo-1552519507-da3b142c6e3d",
    },
    SeedInvestment {
        id: "4",
        title: "Tech Startup Investment",
        investment_type: InvestmentType::HighRisk,
        amount: 50_000,
        profit: None,
        status: InvestmentStatus::Proposed,
        start: "2024-06-01",
        end: Some("2025-06-01"),
        votes: Some((15, 9)),
        image: "photo-1559136555-9303baea8ebd",
    },
    SeedInvestment {
        id: "5",
        title: "Luxury Vacation Rental",
        investment_type: InvestmentType::Rentals,
        amount: 75_000,
        profit: Some((9_200, 12.3)),
        status: InvestmentStatus::Active,
        start: "2023-04-15",
        end: None,
        votes: None,
        image: "photo-1520250497591-112f2f40a3f4",
    },
    SeedInvestment {
        id: "6",
        title: "Fintech SaaS Company",
        investment_type: InvestmentType::Companies,
        amount: 100_000,
        profit: None,
        status: InvestmentStatus::Proposed,
        start: "2024-07-01",
        end: Some("2026-07-01"),
        votes: Some((12, 5)),
        image: "photo-1563986768609-322da13575f3",
    },
    SeedInvestment {
        id: "7",
        title: "Travel Blog Network",
        investment_type: InvestmentType::Websites,
        amount: 35_000,
        profit: Some((4_800, 13.7)),
        status: InvestmentStatus::Active,
        start: "2023-08-10",
        end: Some("2024-08-10"),
        votes: None,
        image: "photo-1581091226033-c6e0f4f4d8be",
    },
    SeedInvestment {
        id: "8",
        title: "Château Margaux 2018",
        investment_type: InvestmentType::Wine,
        amount: 28_000,
        profit: Some((3_600, 12.9)),
        status: InvestmentStatus::Active,
        start: "2022-10-05",
        end: Some("2025-10-05"),
        votes: None,
        image: "photo-1504279577054-acfeccf8fc52",
    },
    SeedInvestment {
        id: "9",
        title: "Beachfront Rental Property",
        investment_type: InvestmentType::RealEstate,
        amount: 350_000,
        profit: None,
        status: InvestmentStatus::Proposed,
        start: "2024-08-15",
        end: None,
        votes: Some((8, 6)),
        image: "photo-1499793983690-e29da59ef1c2",
    },
];

// (id, name, email, contribution, joined, status, last activity, investments)
const INVESTORS: &[(&str, &str, &str, i64, &str, InvestorStatus, &str, i64)] = &[
    ("1", "John Smith", "john.smith@example.com", 75_000, "2022-05-15", InvestorStatus::Active, "2023-06-28", 5),
    ("2", "Emily Johnson", "emily.johnson@example.com", 120_000, "2021-11-03", InvestorStatus::Active, "2023-06-30", 8),
    ("3", "Michael Lee", "michael.lee@example.com", 50_000, "2022-08-22", InvestorStatus::Active, "2023-06-25", 3),
    ("4", "Sarah Miller", "sarah.miller@example.com", 250_000, "2020-03-10", InvestorStatus::Active, "2023-06-29", 12),
    ("5", "David Rodriguez", "david.rodriguez@example.com", 180_000, "2021-05-05", InvestorStatus::Inactive, "2023-03-15", 7),
];

// (id, title, date, type, investment, description)
const EVENTS: &[(&str, &str, &str, &str, Option<&str>, Option<&str>)] = &[
    ("e1", "Luxury Cabernet Collection Matures", "2024-12-15", "completion", Some("1"), None),
    ("e2", "Tech Startup Investment Vote Deadline", "2024-06-01", "vote_deadline", Some("4"), None),
    ("e3", "Downtown Apartment Rental Payment", "2024-06-05", "payment", Some("2"), None),
    ("e4", "Wine Collection Valuation", "2023-07-05", "valuation", Some("1"),
        Some("Annual valuation of the vintage wine collection by expert sommelier")),
    ("e5", "Real Estate Inspection", "2023-07-12", "maintenance", Some("2"),
        Some("Regular inspection of the rental property")),
    ("e6", "Car Collection Display", "2023-07-20", "event", Some("3"),
        Some("Public display of the classic car collection at the annual auto show")),
    ("e7", "Investment Proposal Vote Deadline", "2023-07-25", "deadline", Some("4"),
        Some("Deadline for voting on the tech startup investment proposal")),
    ("e8", "Monthly Rental Income", "2023-07-15", "payment", Some("5"),
        Some("Expected monthly income from the luxury vacation rental")),
];

// (id, investment, author, is_admin, timestamp, text)
const COMMENTS: &[(&str, &str, &str, bool, &str, &str)] = &[
    ("c1", "6", "John Smith", false, "2023-11-15T14:30:00",
        "I really like the team behind this company. The CEO has a strong track record in the fintech space."),
    ("c2", "6", "Emily Johnson", true, "2023-11-16T09:45:00",
        "The valuation seems a bit high for a Series A. What competitive advantages do they have over existing payment processors?"),
    ("c3", "6", "Michael Lee", false, "2023-11-17T16:20:00",
        "I spoke with one of their customers last week. They seem to be very satisfied with the product and mentioned they're planning to expand their usage."),
];

const PROFIT_HISTORY: &[(&str, i64)] = &[
    ("Jan", 12_000),
    ("Feb", 19_000),
    ("Mar", 17_000),
    ("Apr", 21_000),
    ("May", 24_000),
    ("Jun", 28_000),
    ("Jul", 25_000),
    ("Aug", 32_000),
];

fn fintech_detail() -> Result<InvestmentDetail> {
    let milestone = |title: &str, date: &str| -> Result<Milestone> {
        Ok(Milestone {
            title: title.to_string(),
            date: parse_date(date)?,
        })
    };
    let member = |name: &str, role: &str| TeamMember {
        name: name.to_string(),
        role: role.to_string(),
    };
    let document = |name: &str, kind: &str| Document {
        name: name.to_string(),
        kind: kind.to_string(),
    };

    Ok(InvestmentDetail {
        description: "Early-stage investment in a promising fintech SaaS company that provides \
                      payment processing solutions for small businesses. This company has shown \
                      strong initial traction with a growing customer base."
            .to_string(),
        expected_return: 35.0,
        risk_level: RiskLevel::Medium,
        funding_stage: Some("Series A".to_string()),
        location: Some("San Francisco, CA".to_string()),
        team: vec![
            member("Sarah Johnson", "CEO & Co-founder"),
            member("Michael Chen", "CTO & Co-founder"),
            member("David Rodriguez", "CFO"),
        ],
        documents: vec![
            document("Business Plan", "PDF"),
            document("Financial Projections", "XLSX"),
            document("Term Sheet", "PDF"),
        ],
        milestones: vec![
            milestone("Product Launch", "2024-09-01")?,
            milestone("Revenue Milestone ($1M ARR)", "2025-03-01")?,
            milestone("International Expansion", "2025-12-01")?,
        ],
        type_details: None,
    })
}

pub async fn seed_demo_data(pool: &SqlitePool) -> Result<bool> {
    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM investments")
        .fetch_one(pool)
        .await?;

    if existing > 0 {
        tracing::debug!(existing, "database already populated, skipping demo data");
        return Ok(false);
    }

    let mut tx = pool.begin().await?;

    for seed in INVESTMENTS {
        let investment = Investment {
            id: seed.id.to_string(),
            title: seed.title.to_string(),
            investment_type: seed.investment_type,
            amount: seed.amount,
            profit: seed.profit.map(|(profit, _)| profit),
            profit_percentage: seed.profit.map(|(_, pct)| pct),
            status: seed.status,
            start_date: parse_date(seed.start)?,
            end_date: seed.end.map(parse_date).transpose()?,
            votes: seed.votes.map(|(total, positive)| Votes { total, positive }),
            image_src: Some(format!("{IMAGE_BASE}/{}?auto=format&fit=crop&w=870&q=80", seed.image)),
        };
        insert_investment(&mut *tx, &investment).await?;
    }

    insert_investment_detail(&mut *tx, "6", &fintech_detail()?).await?;

    for &(id, name, email, contribution, joined, status, last_activity, count) in INVESTORS {
        let investor = Investor {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            total_contribution: contribution,
            join_date: parse_date(joined)?,
            status,
            last_activity: parse_date(last_activity)?,
            investment_count: count,
            avatar: None,
        };
        insert_investor(&mut *tx, &investor).await?;
    }

    for &(id, title, date, event_type, investment_id, description) in EVENTS {
        sqlx::query(
            "INSERT INTO events (id, title, event_date, event_type, description, investment_id) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(title)
        .bind(date)
        .bind(event_type)
        .bind(description)
        .bind(investment_id)
        .execute(&mut *tx)
        .await?;
    }

    for &(id, investment_id, author, is_admin, timestamp, text) in COMMENTS {
        sqlx::query(
            "INSERT INTO comments (id, investment_id, author_name, is_admin, content, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(investment_id)
        .bind(author)
        .bind(is_admin)
        .bind(text)
        .bind(timestamp)
        .execute(&mut *tx)
        .await?;
    }

    for (position, &(label, profit)) in PROFIT_HISTORY.iter().enumerate() {
        sqlx::query("INSERT INTO profit_history (position, label, profit) VALUES (?, ?, ?)")
            .bind(position as i64)
            .bind(label)
            .bind(profit)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    tracing::info!(
        investments = INVESTMENTS.len(),
        investors = INVESTORS.len(),
        events = EVENTS.len(),
        "seeded demo data"
    );

    Ok(true)
}

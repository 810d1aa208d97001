use rust_xlsxwriter::Workbook;

use sheetchart::chart::{ChartKind, ChartRequest, SeriesPayload};
use sheetchart::config::SheetchartConfig;
use sheetchart::dataset::CellValue;
use sheetchart::errors::{IngestError, SheetchartError};
use sheetchart::services::{Principal, Upload};
use sheetchart::AppContext;

fn sales_workbook() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "region").unwrap();
    worksheet.write_string(0, 1, "revenue").unwrap();
    worksheet.write_string(0, 2, "notes").unwrap();
    let rows = [("north", 120.0), ("south", 80.0), ("north", 40.0), ("east", 80.0)];
    for (i, (region, revenue)) in rows.iter().enumerate() {
        let row = i as u32 + 1;
        worksheet.write_string(row, 0, *region).unwrap();
        worksheet.write_number(row, 1, *revenue).unwrap();
    }
    workbook.save_to_buffer().unwrap()
}

#[tokio::test]
async fn upload_chart_and_list_flow() {
    let ctx = AppContext::new(SheetchartConfig::default());
    let alice = Principal::user("alice");
    let bytes = sales_workbook();

    let dataset = ctx
        .upload(&alice, Upload::new(&bytes, "sales.xlsx"))
        .await
        .expect("Should upload workbook");
    assert_eq!(dataset.columns(), ["region", "revenue", "notes"]);
    assert_eq!(dataset.row_count(), 4);
    assert_eq!(dataset.cell(0, "notes"), Some(&CellValue::Missing));
    assert_eq!(
        ctx.chart_service().numeric_columns(&dataset),
        vec!["revenue"]
    );

    let pie = ctx
        .create_chart(
            &alice,
            dataset.id(),
            ChartRequest::new("Revenue share", ChartKind::Pie, "region", "revenue"),
        )
        .await
        .expect("Should build pie chart");
    match &pie.payload {
        SeriesPayload::Categories(totals) => {
            let pairs: Vec<(&str, f64)> = totals
                .iter()
                .map(|t| (t.category.as_str(), t.total))
                .collect();
            assert_eq!(pairs, vec![("north", 160.0), ("south", 80.0), ("east", 80.0)]);
        }
        other => panic!("unexpected payload {:?}", other),
    }

    let columns = ctx
        .create_chart(
            &alice,
            dataset.id(),
            ChartRequest::new("Revenue", ChartKind::ProjectedColumn, "region", "revenue"),
        )
        .await
        .expect("Should build projected chart");
    match &columns.payload {
        SeriesPayload::Columns(columns) => {
            assert_eq!(columns.len(), 4);
            assert_eq!(columns[0].height, 5.5);
            assert_eq!(columns[2].height, 0.5);
        }
        other => panic!("unexpected payload {:?}", other),
    }

    let listed = ctx.registry().list_charts(&alice).await;
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id(), pie.descriptor.id());

    let overview = ctx.stats_service().overview(&alice).await;
    assert_eq!(overview.dataset_count, 1);
    assert_eq!(overview.chart_count, 2);
    assert_eq!(overview.total_rows, 4);
}

#[tokio::test]
async fn listings_never_leak_other_owners() {
    let ctx = AppContext::new(SheetchartConfig::default());
    let owners = ["alice", "bob", "carol"];
    for (i, owner) in owners.iter().enumerate() {
        let principal = Principal::user(*owner);
        for n in 0..=i {
            let csv = format!("k,v\n{},{}\n", owner, n);
            let dataset = ctx
                .upload(&principal, Upload::new(csv.as_bytes(), "data.csv"))
                .await
                .expect("Should upload csv");
            ctx.create_chart(
                &principal,
                dataset.id(),
                ChartRequest::new("t", ChartKind::Bar, "k", "v"),
            )
            .await
            .expect("Should build chart");
        }
    }

    for owner in owners {
        let principal = Principal::user(owner);
        let datasets = ctx.registry().list_datasets(&principal).await;
        assert!(!datasets.is_empty());
        assert!(datasets.iter().all(|d| d.owner_id() == &principal.id));
        assert_eq!(
            ctx.registry().list_charts(&principal).await.len(),
            datasets.len()
        );
    }

    let admin = Principal::admin("root");
    assert_eq!(ctx.registry().list_datasets(&admin).await.len(), 6);
    assert_eq!(ctx.registry().list_charts(&admin).await.len(), 6);

    let activity = ctx
        .stats_service()
        .owner_activity(&admin)
        .await
        .expect("Admin can see activity");
    let counts: Vec<usize> = activity.iter().map(|a| a.dataset_count).collect();
    assert_eq!(counts, vec![1, 2, 3]);
}

#[tokio::test]
async fn configured_ceiling_rejects_large_uploads() {
    let config = SheetchartConfig {
        max_upload_bytes: 16,
        ..SheetchartConfig::default()
    };
    let ctx = AppContext::new(config);
    let err = ctx
        .upload(
            &Principal::user("alice"),
            Upload::new(b"a,b\n1,2\n3,4\n5,6\n7,8\n", "big.csv"),
        )
        .await
        .expect_err("Should reject oversize upload");

    assert!(matches!(
        err,
        SheetchartError::Ingest(IngestError::Oversize { limit: 16, .. })
    ));
    assert_eq!(err.error_code(), "FILE_TOO_LARGE");
    assert_eq!(ctx.registry().dataset_count().await, 0);
}

#[tokio::test]
async fn mime_declared_upload_without_extension() {
    let ctx = AppContext::new(SheetchartConfig::default());
    let dataset = ctx
        .upload(
            &Principal::user("alice"),
            Upload::new(b"a,b\n1,2\n", "export").with_mime("text/csv"),
        )
        .await
        .expect("Declared csv mime should be accepted");
    assert_eq!(dataset.row_count(), 1);

    let err = ctx
        .upload(&Principal::user("alice"), Upload::new(b"a,b\n1,2\n", "export.txt"))
        .await
        .expect_err("Unknown extension without mime should be rejected");
    assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
}

use std::sync::Arc;

use arrow::array::StringArray;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn range(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.next_u64() % (hi - lo + 1)
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);

    let journals = ["Nature", "Science", "The Lancet", "Cell", "BMJ", "PLOS ONE"];
    let sources = ["PMC", "Medline", "WHO", "biorxiv"];
    let subjects = [
        "Transmission", "Vaccine", "Antibody", "Genome", "Protein", "Outbreak", "Aerosol",
        "Serology",
    ];
    let measures = [
        "dynamics", "responses", "screening", "sequencing", "modelling", "surveillance",
        "kinetics", "trials",
    ];
    let cohorts = [
        "hospitalized patients",
        "healthcare workers",
        "school populations",
        "community settings",
        "long-term care",
        "household contacts",
    ];

    let n_rows = 500;
    let mut titles = Vec::with_capacity(n_rows);
    let mut journal_col = Vec::with_capacity(n_rows);
    let mut dates = Vec::with_capacity(n_rows);
    let mut source_col = Vec::with_capacity(n_rows);

    for _ in 0..n_rows {
        titles.push(format!(
            "{} {} in {}",
            rng.pick(&subjects),
            rng.pick(&measures),
            rng.pick(&cohorts)
        ));

        // A few rows without a journal, to exercise the "Unknown" sentinel.
        journal_col.push(if rng.range(0, 19) == 0 {
            String::new()
        } else {
            rng.pick(&journals).to_string()
        });

        // A few rows with a blank date, which normalization drops.
        dates.push(if rng.range(0, 49) == 0 {
            String::new()
        } else {
            format!(
                "{:04}-{:02}-{:02}",
                rng.range(2019, 2023),
                rng.range(1, 12),
                rng.range(1, 28)
            )
        });

        source_col.push(rng.pick(&sources).to_string());
    }

    // ---- CSV ----
    let mut writer = csv::Writer::from_path("metadata.csv").expect("Failed to create metadata.csv");
    writer
        .write_record(["title", "journal", "publish_time", "source_x"])
        .expect("Failed to write header");
    for i in 0..n_rows {
        writer
            .write_record([&titles[i], &journal_col[i], &dates[i], &source_col[i]])
            .expect("Failed to write record");
    }
    writer.flush().expect("Failed to flush CSV");

    // ---- Parquet ----
    let schema = Arc::new(Schema::new(vec![
        Field::new("title", DataType::Utf8, false),
        Field::new("journal", DataType::Utf8, false),
        Field::new("publish_time", DataType::Utf8, false),
        Field::new("source_x", DataType::Utf8, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(
                titles.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                journal_col.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                dates.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                source_col.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            )),
        ],
    )
    .expect("Failed to create RecordBatch");

    let file = std::fs::File::create("metadata.parquet").expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!("Wrote {n_rows} papers to metadata.csv and metadata.parquet");
}

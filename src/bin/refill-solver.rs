use refill_placement::solver::genetic::search;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    search::run().await
}

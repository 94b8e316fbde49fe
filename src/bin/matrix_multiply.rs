//! Умножение квадратных матриц на GPU через OpenCL
//!
//! Читает N, A и B из stdin, печатает C и время выполнения ядра.
use anyhow::Result;
use opencl_matmul::{
    io::{read_input, write_result, TokenReader},
    logger,
    matrix::{verify_product, GpuMatrixMultiplier},
    utils::measure_time,
    Config,
};
use std::process::ExitCode;

/// Допустимая относительная погрешность при сверке с CPU
const VERIFY_TOLERANCE: f32 = 1e-4;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let config = Config::from_env()?;
    logger::init(config.log_level);
    log::debug!("Настройки: {:?}", config);

    let stdin = std::io::stdin();
    let mut tokens = TokenReader::new(stdin.lock());
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let (a, b) = read_input(&mut tokens, &mut out)?;

    log::info!("Инициализация OpenCL...");
    let multiplier = GpuMatrixMultiplier::new(&config)?;
    let product = multiplier.multiply(&a, &b)?;
    drop(multiplier);
    log::debug!("Ресурсы OpenCL освобождены");

    // При расхождении с CPU результат не печатается
    if config.verify {
        let (comparison, cpu_duration) =
            measure_time(|| verify_product(&a, &b, &product.matrix, VERIFY_TOLERANCE));
        let comparison = comparison?;
        log::info!(
            "Результаты GPU и CPU совпадают (CPU: {:?}, максимальная разница {})",
            cpu_duration,
            comparison.max_abs_diff
        );
    }

    write_result(&mut out, &product.matrix, product.elapsed)
}

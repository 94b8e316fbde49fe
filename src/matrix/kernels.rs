//! OpenCL ядра для матричных операций

/// Имя точки входа ядра умножения
pub const MATRIX_MULTIPLY_KERNEL_NAME: &str = "matrix_multiply";

/// Исходный код ядра для матричного умножения
///
/// Один рабочий элемент на ячейку C. Элементы за пределами N×N ничего не
/// делают, поэтому глобальный размер можно округлять вверх до кратного
/// рабочей группе.
pub static MATRIX_MULTIPLY_KERNEL: &str = r#"
__kernel void matrix_multiply(
    __global const float* a,
    __global const float* b,
    __global float* c,
    const unsigned int size
) {
    const size_t row = get_global_id(0);
    const size_t col = get_global_id(1);

    if (row >= size || col >= size) {
        return;
    }

    float sum = 0.0f;
    for (unsigned int k = 0; k < size; k++) {
        sum += a[row * size + k] * b[k * size + col];
    }
    c[row * size + col] = sum;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_source_declares_entry_point_with_four_arguments() {
        let signature = format!("__kernel void {}(", MATRIX_MULTIPLY_KERNEL_NAME);
        assert!(MATRIX_MULTIPLY_KERNEL.contains(&signature));
        assert_eq!(MATRIX_MULTIPLY_KERNEL.matches("__global").count(), 3);
        assert!(MATRIX_MULTIPLY_KERNEL.contains("const unsigned int size"));
    }
}

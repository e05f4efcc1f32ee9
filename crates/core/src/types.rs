/// The scalar type used throughout the library.
pub type Scalar = f64;

/// Dense matrix type (column-major), subjects in rows and raters in columns.
pub type DenseMatrix = nalgebra::DMatrix<Scalar>;

/// Dense vector type.
pub type DenseVector = nalgebra::DVector<Scalar>;

pub mod pvls;
